//! Symbolic output of the encoders.
//!
//! An encoder never draws anything: it describes a symbol as a stream of
//! [Event]s (bar groups, bars and, for 2-D symbols, rows) which a
//! [ClassicLogicHandler] or [TwoDimLogicHandler] turns into pixels, vectors
//! or whatever the receiver needs. Bar widths are small integer weights whose
//! meaning depends on the symbology (modules, narrow/wide or bar height
//! classes for postal codes).

use core::iter;

/// Semantic tag of a run of bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarGroup {
    StartCharacter,
    StopCharacter,
    MessageCharacter,
    /// UPC/EAN edge, center or UPC-E end guard.
    UpcEanGuard,
    /// Digit printed left of the symbol (EAN-13 first digit, UPC-E number
    /// system). Carries no bars.
    UpcEanLead,
    /// A group of UPC/EAN digits between two guards.
    UpcEanGroup,
    UpcEanCheck,
    UpcEanSupplemental,
}

impl BarGroup {
    /// Short name used by text fixtures.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::StartCharacter => "start-char",
            Self::StopCharacter => "stop-char",
            Self::MessageCharacter => "msg-char",
            Self::UpcEanGuard => "upc-ean-guard",
            Self::UpcEanLead => "upc-ean-lead",
            Self::UpcEanGroup => "upc-ean-group",
            Self::UpcEanCheck => "upc-ean-check",
            Self::UpcEanSupplemental => "upc-ean-supp",
        }
    }
}

/// A single drawing instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    StartBarcode { message: String, human_readable: String },
    StartRow,
    EndRow,
    StartBarGroup { group: BarGroup, label: Option<String> },
    Bar { black: bool, width: u8 },
    EndBarGroup,
    EndBarcode,
}

impl Event {
    /// Forwards the event to a 1-D handler. Row events have no 1-D
    /// counterpart and are dropped.
    pub fn dispatch<H: ClassicLogicHandler + ?Sized>(self, handler: &mut H) {
        match self {
            Event::StartBarcode { message, human_readable } => handler.start_barcode(&message, &human_readable),
            Event::StartBarGroup { group, label } => handler.start_bar_group(group, label.as_deref()),
            Event::Bar { black, width } => handler.add_bar(black, width),
            Event::EndBarGroup => handler.end_bar_group(),
            Event::EndBarcode => handler.end_barcode(),
            Event::StartRow | Event::EndRow => (),
        }
    }

    /// Forwards the event to a 2-D handler.
    pub fn dispatch_2d<H: TwoDimLogicHandler + ?Sized>(self, handler: &mut H) {
        match self {
            Event::StartRow => handler.start_row(),
            Event::EndRow => handler.end_row(),
            other => other.dispatch(handler),
        }
    }
}

/// Receiver for linear symbols.
pub trait ClassicLogicHandler {
    /// Called once before anything else with the encoded message and the
    /// text a renderer should print under (or above) the symbol.
    fn start_barcode(&mut self, message: &str, human_readable: &str);

    fn start_bar_group(&mut self, group: BarGroup, label: Option<&str>);

    /// Appends a bar (`black`) or a space. `width` is a weight resolved by
    /// the symbology's parameters.
    fn add_bar(&mut self, black: bool, width: u8);

    fn end_bar_group(&mut self);

    fn end_barcode(&mut self);
}

/// Receiver for matrix and stacked symbols. A row is a sequence of one
/// module bars.
pub trait TwoDimLogicHandler: ClassicLogicHandler {
    fn start_row(&mut self);
    fn end_row(&mut self);
}

/// Drives a 1-D handler with a stream of events.
pub fn emit<H, I>(handler: &mut H, events: I)
where
    H: ClassicLogicHandler + ?Sized,
    I: IntoIterator<Item = Event>,
{
    for event in events {
        event.dispatch(handler);
    }
}

/// Drives a 2-D handler with a stream of events.
pub fn emit_2d<H, I>(handler: &mut H, events: I)
where
    H: TwoDimLogicHandler + ?Sized,
    I: IntoIterator<Item = Event>,
{
    for event in events {
        event.dispatch_2d(handler);
    }
}

impl ClassicLogicHandler for Vec<Event> {
    fn start_barcode(&mut self, message: &str, human_readable: &str) {
        self.push(Event::StartBarcode { message: message.into(), human_readable: human_readable.into() });
    }

    fn start_bar_group(&mut self, group: BarGroup, label: Option<&str>) {
        self.push(Event::StartBarGroup { group, label: label.map(Into::into) });
    }

    fn add_bar(&mut self, black: bool, width: u8) {
        self.push(Event::Bar { black, width });
    }

    fn end_bar_group(&mut self) {
        self.push(Event::EndBarGroup);
    }

    fn end_barcode(&mut self) {
        self.push(Event::EndBarcode);
    }
}

impl TwoDimLogicHandler for Vec<Event> {
    fn start_row(&mut self) {
        self.push(Event::StartRow);
    }

    fn end_row(&mut self) {
        self.push(Event::EndRow);
    }
}

/// Checks the nesting rules of an event stream: one barcode bracket around
/// everything, rows never nested, groups closed in the row that opened them.
pub fn is_well_nested(events: &[Event]) -> bool {
    let Some((Event::StartBarcode { .. }, rest)) = events.split_first() else { return false };
    let Some((Event::EndBarcode, body)) = rest.split_last() else { return false };

    let mut groups = 0usize;
    let mut in_row = false;
    for event in body {
        match event {
            Event::StartBarcode { .. } | Event::EndBarcode => return false,
            Event::StartRow if in_row || groups > 0 => return false,
            Event::StartRow => in_row = true,
            Event::EndRow if !in_row || groups > 0 => return false,
            Event::EndRow => in_row = false,
            Event::StartBarGroup { .. } => groups += 1,
            Event::EndBarGroup if groups == 0 => return false,
            Event::EndBarGroup => groups -= 1,
            Event::Bar { width, .. } if *width == 0 => return false,
            Event::Bar { .. } => (),
        }
    }
    groups == 0 && !in_row
}

/// Collects the modules of a symbol whose bar widths are module counts
/// (Code128, UPC/EAN, PDF417, Data Matrix). A linear symbol produces a
/// single row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleGrid {
    rows: Vec<Vec<bool>>,
    open: bool,
}

impl ModuleGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Width in modules of the widest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<bool>] {
        &self.rows
    }

    /// Returns whether the module at (`x`, `y`) is dark. Out of range
    /// coordinates are light.
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.rows.get(y).and_then(|row| row.get(x)).copied().unwrap_or(false)
    }

    /// Yields every module row by row, each module repeated `scale.0` times
    /// horizontally and each row `scale.1` times vertically.
    pub fn bits(&self, scale: (u16, u16), inverted: bool) -> impl Iterator<Item = bool> + '_ {
        let (sx, sy) = scale;
        let width = self.width();
        self.rows.iter()
            .flat_map(move |row| iter::repeat(row).take(sy as usize))
            .flat_map(move |row| (0..width).map(move |x| row.get(x).copied().unwrap_or(false)))
            .flat_map(move |bit| iter::repeat(bit ^ inverted).take(sx as usize))
    }

    /// Writes the modules into `target` using `on` for dark modules.
    pub fn fill<P: Clone>(&self, target: &mut [P], on: &P, off: &P) {
        for (slot, bit) in target.iter_mut().zip(self.bits((1, 1), false)) {
            *slot = if bit { on.clone() } else { off.clone() };
        }
    }

    fn current_row(&mut self) -> &mut Vec<bool> {
        if !self.open {
            self.rows.push(Vec::new());
            self.open = true;
        }
        let last = self.rows.len() - 1;
        &mut self.rows[last]
    }
}

impl ClassicLogicHandler for ModuleGrid {
    fn start_barcode(&mut self, _message: &str, _human_readable: &str) {
        self.rows.clear();
        self.open = false;
    }

    fn start_bar_group(&mut self, _group: BarGroup, _label: Option<&str>) {}

    fn add_bar(&mut self, black: bool, width: u8) {
        let row = self.current_row();
        row.extend(iter::repeat(black).take(width as usize));
    }

    fn end_bar_group(&mut self) {}

    fn end_barcode(&mut self) {
        self.open = false;
    }
}

impl TwoDimLogicHandler for ModuleGrid {
    fn start_row(&mut self) {
        self.rows.push(Vec::new());
        self.open = true;
    }

    fn end_row(&mut self) {
        self.open = false;
    }
}

// Building blocks used by the encoders to assemble their event streams.

pub(crate) fn barcode<I>(message: String, human_readable: String, body: I) -> impl Iterator<Item = Event>
where
    I: IntoIterator<Item = Event>,
{
    iter::once(Event::StartBarcode { message, human_readable })
        .chain(body)
        .chain(iter::once(Event::EndBarcode))
}

pub(crate) fn group<I>(group: BarGroup, label: Option<String>, bars: I) -> impl Iterator<Item = Event>
where
    I: IntoIterator<Item = Event>,
{
    iter::once(Event::StartBarGroup { group, label })
        .chain(bars)
        .chain(iter::once(Event::EndBarGroup))
}

/// Alternating bars and spaces, the first element being a bar when
/// `black_first` is set.
pub(crate) fn alternating<I>(widths: I, black_first: bool) -> impl Iterator<Item = Event>
where
    I: IntoIterator<Item = u8>,
{
    widths.into_iter()
        .enumerate()
        .map(move |(i, width)| Event::Bar { black: (i % 2 == 0) == black_first, width })
}

pub(crate) const fn bar(black: bool, width: u8) -> Event {
    Event::Bar { black, width }
}

/// Wraps rows of modules into 2-D row events, merging runs of equal modules
/// into a single bar.
pub(crate) fn module_rows<R>(rows: R) -> impl Iterator<Item = Event>
where
    R: IntoIterator<Item = Vec<bool>>,
{
    rows.into_iter().flat_map(|row| {
        iter::once(Event::StartRow)
            .chain(runs(row))
            .chain(iter::once(Event::EndRow))
    })
}

fn runs(row: Vec<bool>) -> impl Iterator<Item = Event> {
    let mut out = Vec::new();
    let mut modules = row.into_iter().peekable();
    while let Some(black) = modules.next() {
        let mut width: u8 = 1;
        while width < u8::MAX && modules.peek() == Some(&black) {
            modules.next();
            width += 1;
        }
        out.push(Event::Bar { black, width });
    }
    out.into_iter()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_handler_records_events() {
        let mut events: Vec<Event> = Vec::new();
        events.start_barcode("1", "1");
        events.start_bar_group(BarGroup::MessageCharacter, Some("1"));
        events.add_bar(true, 2);
        events.end_bar_group();
        events.end_barcode();

        assert_eq!(events[2], Event::Bar { black: true, width: 2 });
        assert!(is_well_nested(&events));
    }

    #[test]
    fn test_nesting_rejects_unbalanced() {
        let events = vec![
            Event::StartBarcode { message: String::new(), human_readable: String::new() },
            Event::StartRow,
            Event::StartBarGroup { group: BarGroup::StartCharacter, label: None },
            Event::EndRow,
            Event::EndBarcode,
        ];
        assert!(!is_well_nested(&events));
        assert!(!is_well_nested(&events[1..]));
    }

    #[test]
    fn test_module_grid_rows() {
        let mut grid = ModuleGrid::new();
        emit_2d(&mut grid, barcode(String::new(), String::new(), module_rows(vec![
            vec![true, true, false],
            vec![false, true, true],
        ])));

        assert_eq!((grid.width(), grid.height()), (3, 2));
        assert!(grid.get(0, 0) && !grid.get(0, 1) && grid.get(2, 1));
        assert!(!grid.get(9, 9));

        let scaled: Vec<bool> = grid.bits((2, 1), false).collect();
        assert_eq!(scaled, [true, true, true, true, false, false, false, false, true, true, true, true]);
    }

    #[test]
    fn test_module_grid_linear() {
        let mut grid = ModuleGrid::new();
        emit(&mut grid, barcode(String::new(), String::new(), alternating([2, 1, 3], true)));
        assert_eq!(grid.rows(), &[vec![true, true, false, true, true, true]]);
    }

    #[test]
    fn test_runs_merge_modules() {
        let events: Vec<Event> = module_rows(vec![vec![true, true, false, true]]).collect();
        assert_eq!(events, [
            Event::StartRow,
            bar(true, 2), bar(false, 1), bar(true, 1),
            Event::EndRow,
        ]);
    }
}

//! Prints a symbol with ANSI blocks.
//!
//! `cargo run --example terminal -- datamatrix "Hello, world!"`

use std::{env, process::ExitCode};

use symbology::{logic::ModuleGrid, Error, Generator, Symbology};

const WHITE: &str = "\x1B[38;2;255;255;255m█";
const BLACK: &str = "\x1B[38;2;0;0;0m█";

const PADDING: usize = 4;
const LINEAR_HEIGHT: u16 = 8;

fn display_bits(width: usize, bits: &[bool]) {
    let quiet_zone_v = str::repeat(WHITE, width + PADDING * 2);
    let quiet_zone_h = &quiet_zone_v[..PADDING * WHITE.len()];

    println!("{quiet_zone_v}\n{quiet_zone_v}");
    for chunk in bits.chunks(width) {
        print!("{quiet_zone_h}");
        for &on in chunk {
            print!("{}", if on { BLACK } else { WHITE });
        }
        println!("{quiet_zone_h}");
    }
    println!("{quiet_zone_v}\n{quiet_zone_v}\x1B[0m");
}

fn run(name: &str, message: &str) -> symbology::Result<()> {
    let symbology: Symbology = name.parse()?;
    if matches!(symbology, Symbology::Postnet | Symbology::Usps4Cb | Symbology::RoyalMailCbc) {
        return Err(Error::UnsupportedOperation(format!("{symbology} bars are heights, not modules")));
    }

    let generator = Generator::from_symbology(symbology)?;
    let mut grid = ModuleGrid::new();
    generator.generate_barcode(&mut grid, message)?;

    let scale = if symbology.is_two_dimensional() { (1, 1) } else { (1, LINEAR_HEIGHT) };
    let bits: Vec<bool> = grid.bits(scale, false).collect();
    display_bits(grid.width(), &bits);

    let dim = generator.calc_dimensions(message)?;
    println!("{symbology}: {} x {} modules, {:.2} x {:.2} mm", grid.width(), grid.height(), dim.width(), dim.height());
    Ok(())
}

fn main() -> ExitCode {
    let mut args = env::args().skip(1);
    let (Some(name), Some(message)) = (args.next(), args.next()) else {
        eprintln!("usage: terminal <symbology> <message>");
        return ExitCode::FAILURE;
    };

    match run(&name, &message) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

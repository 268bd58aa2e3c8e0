use std::env;
use std::fs;

use tangram_core::ShapesCatalog;
use tangram_render::{LayoutFile, build_svg, describe, encode_png, judge, render_pixmap};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: tangram-render <layout.json> <output.(png|svg)> [px_scale] [shapes.json]");
        std::process::exit(2);
    }
    let input = &args[1];
    let output = &args[2];
    let px_scale: f64 = args
        .get(3)
        .and_then(|s| s.parse().ok())
        .filter(|s: &f64| *s > 0.0)
        .unwrap_or(1.0);
    let catalog = match args.get(4) {
        Some(path) => ShapesCatalog::from_json(&fs::read_to_string(path)?)?,
        None => ShapesCatalog::builtin(),
    };

    let layout: LayoutFile = serde_json::from_str(&fs::read_to_string(input)?)?;
    let session = layout.session(catalog)?;
    let report = judge(&session);
    for v in &report.violations {
        println!("{}", describe(&session, v));
    }
    println!("{}", if report.victory { "victory" } else { "no victory" });

    let (w, h) = layout.size();
    let svg = build_svg(&session, w, h);
    if output.ends_with(".svg") {
        fs::write(output, svg)?;
    } else {
        let pixmap = render_pixmap(&svg, w, h, px_scale)?;
        encode_png(&pixmap, fs::File::create(output)?)?;
    }
    Ok(())
}

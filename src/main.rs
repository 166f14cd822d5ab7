//! # Kansha CLI
//!
//! Usage:
//!   kansha input.json -o output.svg
//!   echo '{ ... }' | kansha -o output.svg
//!   kansha input.json --debug
//!   kansha --example > card.json
//!
//! Logging goes to stderr and is controlled by `RUST_LOG`.

use std::env;
use std::fs;
use std::io::{self, Read};
use std::process;

use log::info;

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    // Handle --example flag
    if args.iter().any(|a| a == "--example") {
        print!("{}", example_card_json());
        return;
    }

    // Read input
    let input = if args.len() > 1 && !args[1].starts_with('-') {
        fs::read_to_string(&args[1]).unwrap_or_else(|e| {
            fail(&format!("Failed to read input file '{}': {}", args[1], e))
        })
    } else {
        let mut buf = String::new();
        if let Err(e) = io::stdin().read_to_string(&mut buf) {
            fail(&format!("Failed to read stdin: {}", e));
        }
        buf
    };

    // Parse output path
    let output_path = args
        .windows(2)
        .find(|w| w[0] == "-o")
        .map(|w| w[1].clone())
        .unwrap_or_else(|| "output.svg".to_string());
    let force_debug = args.iter().any(|a| a == "--debug");

    let mut document: kansha::model::Document = match serde_json::from_str(&input) {
        Ok(document) => document,
        Err(e) => fail(&kansha::KanshaError::from(e).to_string()),
    };
    document.debug |= force_debug;

    // Render
    match kansha::render(&document) {
        Ok(svg) => {
            if let Err(e) = fs::write(&output_path, &svg) {
                fail(&format!("Failed to write '{}': {}", output_path, e));
            }
            info!("rendered {} elements", document.root.count());
            eprintln!("✓ Written {} bytes to {}", svg.len(), output_path);
        }
        Err(e) => fail(&e.to_string()),
    }
}

fn fail(message: &str) -> ! {
    eprintln!("✗ {}", message);
    process::exit(1);
}

fn example_card_json() -> &'static str {
    r##"{
  "width": 360,
  "root": {
    "kind": { "type": "View" },
    "style": {
      "width": 360,
      "padding": 16,
      "backgroundColor": "#ffffff",
      "borderWidth": 1,
      "borderColor": "#d0d7de",
      "fontFamily": "Helvetica, sans-serif"
    },
    "children": [
      {
        "kind": { "type": "View" },
        "style": {
          "flexDirection": "Row",
          "justifyContent": "SpaceBetween",
          "alignItems": "Center",
          "margin": { "bottom": 12 }
        },
        "children": [
          {
            "kind": { "type": "Text", "content": "Kansha" },
            "style": { "fontSize": 24, "color": "#1f2328" }
          },
          {
            "kind": { "type": "Text", "content": "v0.1" },
            "style": { "fontSize": 12, "color": "#656d76" }
          }
        ]
      },
      {
        "kind": {
          "type": "Text",
          "content": "Boxes in, SVG out. Layout follows the flexbox rules: rows, columns, wrapping, flexible children and absolute positioning."
        },
        "style": { "fontSize": 14, "lineHeight": 1.4, "color": "#1f2328" }
      },
      {
        "kind": { "type": "View" },
        "style": {
          "flexDirection": "Row",
          "margin": { "top": 12 }
        },
        "children": [
          {
            "kind": { "type": "View" },
            "style": { "flex": 1, "height": 8, "backgroundColor": "#2da44e" }
          },
          {
            "kind": { "type": "View" },
            "style": { "flex": 2, "height": 8, "backgroundColor": "#bf8700" }
          },
          {
            "kind": { "type": "View" },
            "style": { "flex": 1, "height": 8, "backgroundColor": "#cf222e", "opacity": 0.6 }
          }
        ]
      }
    ]
  }
}
"##
}

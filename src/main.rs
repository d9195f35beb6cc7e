//! # Quire CLI
//!
//! Usage:
//!   quire input.json -o pages.json
//!   echo '{ ... }' | quire
//!   quire --example > document.json
//!   quire input.json --skip-missing-images
//!
//! Writes the laid-out pages as JSON. Set `RUST_LOG=debug` to trace page
//! breaks.

use std::env;
use std::fs;
use std::io::{self, Read};
use std::process;

use quire::image_loader::{DefaultImageLoader, ImageErrorPolicy};
use quire::model::Document;
use quire::Renderer;

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--example") {
        print!("{}", example_document_json());
        return;
    }

    if let Err(message) = run(&args) {
        eprintln!("✗ {}", message);
        process::exit(1);
    }
}

fn run(args: &[String]) -> Result<(), String> {
    let input = if args.len() > 1 && !args[1].starts_with('-') {
        fs::read_to_string(&args[1]).map_err(|e| format!("Failed to read {}: {}", args[1], e))?
    } else {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("Failed to read stdin: {}", e))?;
        buf
    };

    let output_path = args.windows(2).find(|w| w[0] == "-o").map(|w| w[1].clone());
    let skip_images = args.iter().any(|a| a == "--skip-missing-images");

    let document: Document = serde_json::from_str(&input)
        .map_err(|e| quire::error::RenderError::from(e).to_string())?;

    let mut renderer = Renderer::new()
        .with_page(document.page)
        .with_document_fonts(&document.fonts)
        .map_err(|e| e.to_string())?;
    if skip_images {
        renderer = renderer.with_image_loader(DefaultImageLoader::new(ImageErrorPolicy::Skip));
    }

    let pages = renderer.render(&document.root).map_err(|e| e.to_string())?;
    let json = serde_json::to_string_pretty(&pages).map_err(|e| e.to_string())?;

    match output_path {
        Some(path) => {
            fs::write(&path, &json).map_err(|e| format!("Failed to write {}: {}", path, e))?;
            eprintln!("✓ Laid out {} page(s) to {}", pages.len(), path);
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn example_document_json() -> &'static str {
    r##"{
  "page": {
    "size": "A4",
    "margin": { "top": 54, "right": 54, "bottom": 54, "left": 54 }
  },
  "root": {
    "kind": { "type": "Document" },
    "children": [
      {
        "kind": { "type": "Heading", "level": 1 },
        "children": [{ "kind": { "type": "Text", "content": "Release Notes" } }]
      },
      {
        "kind": { "type": "Paragraph" },
        "children": [
          { "kind": { "type": "Text", "content": "This release brings " } },
          {
            "kind": { "type": "Emphasis", "level": 2 },
            "children": [{ "kind": { "type": "Text", "content": "faster layout" } }]
          },
          { "kind": { "type": "Text", "content": " and a new " } },
          {
            "kind": { "type": "CodeSpan" },
            "children": [{ "kind": { "type": "Text", "content": "--example" } }]
          },
          { "kind": { "type": "Text", "content": " flag. See " } },
          { "kind": { "type": "AutoLink", "url": "https://example.com/changes" } },
          { "kind": { "type": "Text", "content": " for details." } }
        ]
      },
      {
        "kind": { "type": "List", "ordered": true },
        "children": [
          {
            "kind": { "type": "ListItem" },
            "children": [
              {
                "kind": { "type": "TextBlock" },
                "children": [{ "kind": { "type": "Text", "content": "Tables keep rows together" } }]
              }
            ]
          },
          {
            "kind": { "type": "ListItem" },
            "children": [
              {
                "kind": { "type": "TextBlock" },
                "children": [{ "kind": { "type": "Text", "content": "Lists paginate their markers" } }]
              }
            ]
          }
        ]
      },
      {
        "kind": { "type": "Table", "alignments": [null, "Right"] },
        "children": [
          {
            "kind": { "type": "TableHeader" },
            "children": [
              {
                "kind": { "type": "TableCell" },
                "children": [{ "kind": { "type": "Text", "content": "Module" } }]
              },
              {
                "kind": { "type": "TableCell", "align": "Right" },
                "children": [{ "kind": { "type": "Text", "content": "Tests" } }]
              }
            ]
          },
          {
            "kind": { "type": "TableRow" },
            "children": [
              {
                "kind": { "type": "TableCell" },
                "children": [{ "kind": { "type": "Text", "content": "layout" } }]
              },
              {
                "kind": { "type": "TableCell", "align": "Right" },
                "children": [{ "kind": { "type": "Text", "content": "42" } }]
              }
            ]
          }
        ]
      },
      {
        "kind": { "type": "CodeBlock", "lines": ["quire doc.json -o pages.json", "cat pages.json"] }
      },
      { "kind": { "type": "ThematicBreak" } },
      {
        "kind": { "type": "Blockquote" },
        "children": [
          {
            "kind": { "type": "Paragraph" },
            "children": [{ "kind": { "type": "Text", "content": "Geometry first, ink second." } }]
          }
        ]
      }
    ]
  }
}
"##
}

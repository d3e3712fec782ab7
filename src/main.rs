//! page-flow CLI (for testing purposes only)
//! The main interface is through WASM bindings.
//!
//! Usage: page-flow [document.json] [page-size]
//! Set RUST_LOG=page_flow=debug to trace measurement and reflow.

use page_flow::{
    schema, ComputedSurface, Document, Editor, FontMetrics, NodeGeometryProviders,
    PageOptionResolver, PageOptions, PageSize,
};
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> page_flow::Result<()> {
    let mut args = std::env::args().skip(1);
    let doc = match args.next() {
        Some(path) => {
            let json = std::fs::read_to_string(&path)?;
            Document::from_json(&json)?
        }
        None => sample_document(),
    };

    let mut options = PageOptions::default();
    if let Some(size) = args.next().as_deref().and_then(PageSize::preset) {
        options.size = size;
    }

    let surface = Rc::new(ComputedSurface::new(&options, FontMetrics::default()));
    let mut editor = Editor::new(
        doc,
        PageOptionResolver::shared(options),
        NodeGeometryProviders::headless(surface),
    )?;

    println!("page-flow pagination demo");
    println!("=========================");
    println!(
        "Page {}x{} px, body height {:.1} px",
        options.size.width,
        options.size.height,
        options.body_height()
    );
    print_pages(&editor);

    println!();
    println!("Switching to landscape...");
    editor.set_page_options(PageOptions {
        orientation: page_flow::layout::Orientation::Landscape,
        ..options
    })?;
    print_pages(&editor);

    println!();
    println!("Undo:");
    editor.undo()?;
    print_pages(&editor);
    Ok(())
}

fn print_pages(editor: &Editor) {
    println!("{} page(s)", editor.page_count());
    for (index, page) in editor.pages().iter().enumerate() {
        let blocks = page.body().map(|b| b.child_count()).unwrap_or(0);
        println!("  page {:>3}: {:>3} block(s)", index + 1, blocks);
    }
}

fn sample_document() -> Document {
    let text = "Pagination keeps every page body within its height budget. ".repeat(8);
    let mut blocks = Vec::new();
    for i in 0..30 {
        if i % 10 == 0 {
            blocks.push(schema::heading(1, &format!("Section {}", i / 10 + 1)));
        }
        blocks.push(schema::paragraph(&text));
        if i % 7 == 3 {
            blocks.push(schema::image(320.0, 240.0));
        }
        if i % 9 == 4 {
            blocks.push(schema::table(vec![
                schema::row(&["Name", "Value"]),
                schema::row(&["width", "554"]),
                schema::row(&["height", "931"]),
            ]));
        }
    }
    Document::from_blocks(blocks)
}

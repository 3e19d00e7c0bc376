//! flipbook - paginate a post the way the reader would
//!
//! Runs the reader against the headless display, so pages are laid out
//! from text metrics instead of a browser.

use std::fs;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;

use flipbook_reader::content::plain_text;
use flipbook_reader::layout::FontMetrics;
use flipbook_reader::{CanonicalContent, HeadlessDisplay, Reader, ReaderConfig, Viewport};

#[derive(Parser)]
#[command(name = "flipbook")]
#[command(version, about = "Paginate a post into book pages", long_about = None)]
#[command(after_help = "EXAMPLES:
    flipbook post.html                    Pages for a 1280x900 viewport
    flipbook post.html -W 600 -H 800      Single-page mode on a phone-sized viewport
    flipbook post.html --json             Page layout as JSON")]
struct Cli {
    /// Post body: blocks separated by blank lines, plain text or HTML
    #[arg(value_name = "INPUT")]
    input: String,

    /// Viewport width in pixels
    #[arg(short = 'W', long, default_value_t = 1280.0)]
    width: f32,

    /// Viewport height in pixels
    #[arg(short = 'H', long, default_value_t = 900.0)]
    height: f32,

    /// Reader configuration (JSON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Header markup to use as the cover page
    #[arg(long)]
    cover: Option<String>,

    /// Line height in pixels for text measurement
    #[arg(long, default_value_t = 30.6)]
    line_height: f32,

    /// Average glyph advance in pixels
    #[arg(long, default_value_t = 9.0)]
    char_width: f32,

    /// Print the layout as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LayoutReport {
    mode: flipbook_reader::DisplayMode,
    page_width: f32,
    page_height: f32,
    pages: Vec<PageReport>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageReport {
    height: f32,
    blocks: Vec<u32>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Blocks are separated by blank lines; text not starting with a tag
/// becomes a paragraph.
fn read_blocks(source: &str) -> Vec<String> {
    source
        .split("\n\n")
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .map(|block| {
            if block.starts_with('<') {
                block.to_string()
            } else {
                format!("<p>{block}</p>")
            }
        })
        .collect()
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => ReaderConfig::from_json(&fs::read_to_string(path)?)?,
        None => ReaderConfig::default(),
    };

    let source = fs::read_to_string(&cli.input)?.replace("\r\n", "\n");
    let mut content = CanonicalContent::from_html_blocks(read_blocks(&source));
    if let Some(cover) = &cli.cover {
        content.insert_cover(cover);
    }

    let display = HeadlessDisplay::new(FontMetrics::uniform(cli.line_height, cli.char_width), 24.0);
    let viewport = Viewport::new(cli.width, cli.height);
    let reader = Reader::activate(config, content, viewport, display)?;
    log::info!("laid out {} pages", reader.pages().len());

    let geometry = reader.geometry();
    if cli.json {
        let report = LayoutReport {
            mode: geometry.mode,
            page_width: geometry.page_width,
            page_height: geometry.page_height,
            pages: reader
                .pages()
                .pages()
                .iter()
                .map(|page| PageReport {
                    height: page.height(),
                    blocks: page.blocks().iter().map(|id| id.0).collect(),
                })
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{:?} mode, pages {:.0}x{:.0}px",
        geometry.mode, geometry.page_width, geometry.page_height
    );
    let total = reader.pages().len();
    let budget = reader.pages().budget();
    for (idx, page) in reader.pages().pages().iter().enumerate() {
        println!();
        println!(
            "--- Page {} of {total} ({:.0} of {budget:.0}px) ---",
            idx + 1,
            page.height()
        );
        for id in page.blocks() {
            let html = reader.content().html(*id);
            println!("{}", plain_text(html).trim());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_blocks() {
        let blocks = read_blocks("First para\nwraps\n\n\n<h2>Title</h2>\n\n  \n\nLast");
        assert_eq!(
            blocks,
            vec!["<p>First para\nwraps</p>", "<h2>Title</h2>", "<p>Last</p>"]
        );
    }
}

use anyhow::Context;
use image2pdf::inspect_pdf;
use std::fs;
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let path: PathBuf = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: inspect-pdf <file.pdf>")?;

    let bytes = fs::read(&path).with_context(|| format!("Failed to read {:?}", path))?;
    println!("Read {} bytes", bytes.len());

    let pages = inspect_pdf(&bytes).with_context(|| format!("Failed to inspect {:?}", path))?;
    println!("Pages: {}", pages.len());
    for page in &pages {
        println!(
            "  page {}: {}x{} px on {:.2}x{:.2} pt = {} DPI",
            page.page_number,
            page.pixel_width,
            page.pixel_height,
            page.width_points,
            page.height_points,
            page.resolution()
        );
    }

    Ok(())
}

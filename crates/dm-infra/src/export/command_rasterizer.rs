//! Rasterize-and-paginate through an external HTML → PDF command.
//! 通过外部 HTML → PDF 命令进行栅格化与分页。
//!
//! The subtree's self-contained markup is written to a scratch directory,
//! wrapped in a page that carries the page size and background as CSS, and
//! handed to the configured command. Margins are applied by the command only,
//! through `{margin_mm}`. Placeholders in the command line are substituted
//! from [`RasterizeOptions`]:
//!
//! | placeholder       | value                                  |
//! |-------------------|----------------------------------------|
//! | `{input}`         | path of the generated HTML file        |
//! | `{output}`        | path the command must write the PDF to |
//! | `{page_size}`     | `A4`, `Letter`                         |
//! | `{orientation}`   | `Portrait`, `Landscape`                |
//! | `{margin_mm}`     | uniform margin in millimetres          |
//! | `{image_quality}` | 0 – 100                                |
//! | `{dpi}`           | 96 × pixel scale                       |
//! | `{background}`    | page background colour                 |

use std::path::Path;
use std::process::Stdio;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use dm_core::ports::{RasterizerPort, RenderedSubtreePort};
use dm_core::RasterizeOptions;

pub const DEFAULT_COMMAND: &str = "wkhtmltopdf --quiet --enable-local-file-access \
     --page-size {page_size} --orientation {orientation} \
     --margin-top {margin_mm}mm --margin-bottom {margin_mm}mm \
     --margin-left {margin_mm}mm --margin-right {margin_mm}mm \
     --image-quality {image_quality} --dpi {dpi} {input} {output}";

const CSS_DPI: f32 = 96.0;

pub struct CommandRasterizer {
    program: String,
    args: Vec<String>,
}

impl CommandRasterizer {
    /// Build from a whitespace-separated command line with placeholders.
    pub fn from_command_line(command_line: &str) -> Result<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| anyhow!("rasterizer command is empty"))?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn render_args(&self, input: &Path, output: &Path, options: &RasterizeOptions) -> Vec<String> {
        let margin_mm = format!("{:.1}", options.margin_mm());
        let image_quality = format!("{}", (options.image.quality * 100.0).round() as u32);
        let dpi = format!("{}", (CSS_DPI * options.canvas.scale).round() as u32);
        let input = input.display().to_string();
        let output = output.display().to_string();

        self.args
            .iter()
            .map(|arg| {
                arg.replace("{input}", &input)
                    .replace("{output}", &output)
                    .replace("{page_size}", options.page.format.as_str())
                    .replace("{orientation}", options.page.orientation.as_str())
                    .replace("{margin_mm}", &margin_mm)
                    .replace("{image_quality}", &image_quality)
                    .replace("{dpi}", &dpi)
                    .replace("{background}", &options.canvas.background_color)
            })
            .collect()
    }
}

#[async_trait]
impl RasterizerPort for CommandRasterizer {
    async fn rasterize(
        &self,
        subtree: &dyn RenderedSubtreePort,
        options: &RasterizeOptions,
    ) -> Result<Vec<u8>> {
        let markup = subtree
            .outer_html()
            .with_context(|| format!("serialize subtree {}", subtree.id()))?;

        let scratch = tempfile::Builder::new()
            .prefix("docmat-raster-")
            .tempdir()
            .context("create rasterizer scratch directory")?;
        let input = scratch.path().join("document.html");
        let output = scratch.path().join("document.pdf");

        tokio::fs::write(&input, print_document(&markup, options))
            .await
            .with_context(|| format!("write {}", input.display()))?;

        let args = self.render_args(&input, &output, options);
        debug!(program = %self.program, ?args, "Running rasterizer");

        let result = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .with_context(|| format!("spawn rasterizer `{}`", self.program))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            warn!(status = %result.status, stderr = %stderr.trim(), "Rasterizer failed");
            return Err(anyhow!(
                "rasterizer `{}` exited with {}: {}",
                self.program,
                result.status,
                stderr.trim()
            ));
        }

        tokio::fs::read(&output)
            .await
            .with_context(|| format!("rasterizer produced no output at {}", output.display()))
    }
}

/// Stand-alone page around the subtree markup. The page box only sets the
/// size; the margin comes from `{margin_mm}` on the command line.
fn print_document(markup: &str, options: &RasterizeOptions) -> String {
    let (width, height) = options.page.size_in_inches();
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\">\
         <style>@page {{ size: {width}in {height}in; }} \
         html, body {{ margin: 0; background: {background}; }}</style>\
         </head><body>{markup}</body></html>\n",
        background = options.canvas.background_color,
    )
}

//! Print the OpenAPI document as pretty JSON.

use color_eyre::eyre::Result;
use postcards::ApiDoc;
use utoipa::OpenApi;

fn main() -> Result<()> {
    color_eyre::install()?;
    println!("{}", ApiDoc::openapi().to_pretty_json()?);
    Ok(())
}

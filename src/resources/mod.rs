//! Loading of matcap images and typeface data from external files.
//!
//! Natively assets resolve relative to an `assets` directory next to the
//! binary; on the web they are fetched from the site the page was served
//! from. Decoding happens here so callers only deal with parsed data.

use anyhow::Result;

use crate::text::Typeface;

/// Where the typeface ships, relative to the assets directory.
pub const TYPEFACE_PATH: &str = "fonts/dejavu_sans.typeface.json";

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> Result<reqwest::Url> {
    use anyhow::{Context, anyhow};

    let window = web_sys::window().context("no window object")?;
    let origin = window
        .location()
        .origin()
        .map_err(|_| anyhow!("no page origin"))?;
    let base = reqwest::Url::parse(&format!("{origin}/assets/"))?;
    Ok(base.join(file_name)?)
}

pub async fn load_string(file_name: &str) -> Result<String> {
    #[cfg(target_arch = "wasm32")]
    let txt = {
        let url = format_url(file_name)?;
        reqwest::get(url).await?.error_for_status()?.text().await?
    };
    #[cfg(not(target_arch = "wasm32"))]
    let txt = {
        let path = std::path::Path::new("./").join("assets").join(file_name);
        std::fs::read_to_string(path)?
    };

    Ok(txt)
}

pub async fn load_binary(file_name: &str) -> Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(file_name)?;
        reqwest::get(url)
            .await?
            .error_for_status()?
            .bytes()
            .await?
            .to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        let path = std::path::Path::new("./").join("assets").join(file_name);
        std::fs::read(path)?
    };

    Ok(data)
}

/// Fetch and decode a matcap image. Decoding happens off the render loop so
/// only the GPU upload remains for the frame that applies it.
pub async fn load_matcap(file_name: &str) -> Result<image::DynamicImage> {
    let bytes = load_binary(file_name).await?;
    Ok(image::load_from_memory(&bytes)?)
}

/// Fetch and parse the typeface.
pub async fn load_typeface(file_name: &str) -> Result<Typeface> {
    let json = load_string(file_name).await?;
    Typeface::from_json(&json)
}

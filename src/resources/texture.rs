//! Asset byte IO and LDR texture loading.
//!
//! Relative names resolve under the staged `assets/` directory; `http(s)://`
//! sources are fetched over the network. On the web everything is fetched
//! relative to the page origin.

use crate::data_structures::texture::Texture;

fn is_remote(file_name: &str) -> bool {
    file_name.starts_with("http://") || file_name.starts_with("https://")
}

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> reqwest::Url {
    let window = web_sys::window().unwrap();
    let location = window.location();
    let origin = location.origin().unwrap();
    let base = reqwest::Url::parse(&format!("{}/assets/", origin)).unwrap();
    base.join(file_name).unwrap()
}

/// Read an asset into memory, from disk or over the network.
pub async fn load_binary(file_name: &str) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = if is_remote(file_name) {
            reqwest::Url::parse(file_name)?
        } else {
            format_url(file_name)
        };
        reqwest::get(url).await?.bytes().await?.to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = if is_remote(file_name) {
        let mut response = ureq::get(file_name).call()?;
        response.body_mut().read_to_vec()?
    } else {
        let path = std::path::Path::new("./").join("assets").join(file_name);
        std::fs::read(path)?
    };

    Ok(data)
}

/// Load an LDR texture asset (base colour maps).
pub async fn load_texture(
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<Texture> {
    let data = load_binary(file_name).await?;
    Texture::from_bytes(device, queue, &data, file_name, true)
}

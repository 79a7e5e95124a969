use std::env;
use std::path::PathBuf;

use anyhow::Result;
use fs_extra::copy_items;
use fs_extra::dir::CopyOptions;

// Stage the asset directory (model + HDRI files) next to the build output so
// the viewer can resolve relative asset paths at runtime.
fn main() -> Result<()> {
    println!("cargo:rerun-if-changed=assets/*");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let assets = manifest_dir.join("assets");
    if assets.exists() {
        let out_dir = env::var("OUT_DIR")?;
        let mut options = CopyOptions::new();
        options.overwrite = true;
        copy_items(&["assets/"], out_dir, &options)?;
    }

    Ok(())
}

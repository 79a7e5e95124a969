use hdri_view::{options::ViewerOptions, viewer};

fn main() -> anyhow::Result<()> {
    viewer::run(ViewerOptions::default())
}

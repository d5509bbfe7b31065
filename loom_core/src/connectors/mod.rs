pub mod loom;

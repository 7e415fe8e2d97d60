pub mod civitai;

//! Loaders and image bytes shared by asset and session unit tests.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Mutex;
use std::sync::mpsc;

use crate::assets::loader::{AssetLoader, MemoryLoader};
use crate::foundation::error::{CardError, CardResult};

/// Encoded PNG of a solid `w` x `h` image.
pub(crate) fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

pub(crate) type Gate = mpsc::Sender<CardResult<Vec<u8>>>;

/// Loader whose gated paths block until the test releases them. Ungated paths fall through to an
/// in-memory map.
#[derive(Default)]
pub(crate) struct GatedLoader {
    gates: Mutex<HashMap<String, mpsc::Receiver<CardResult<Vec<u8>>>>>,
    pub(crate) open: MemoryLoader,
}

impl GatedLoader {
    pub(crate) fn with_open(open: MemoryLoader) -> Self {
        Self {
            gates: Mutex::default(),
            open,
        }
    }

    pub(crate) fn gate(&self, path: &str) -> Gate {
        let (tx, rx) = mpsc::channel();
        self.gates.lock().unwrap().insert(path.to_string(), rx);
        tx
    }
}

impl AssetLoader for GatedLoader {
    fn load(&self, path: &str) -> CardResult<Vec<u8>> {
        let gate = self.gates.lock().unwrap().remove(path);
        match gate {
            Some(rx) => rx
                .recv()
                .unwrap_or_else(|_| Err(CardError::asset("gate dropped"))),
            None => self.open.load(path),
        }
    }
}

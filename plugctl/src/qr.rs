use crate::types::{PayloadError, SetupPayload};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum QrDecodeError {
    #[error("Failed to read QR code image {}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        error: Box<image::ImageError>,
    },
    #[error("No QR code found in {}", .path.display())]
    NoQrCode { path: PathBuf },
    #[error("Found {grids} QR code(s) in {} but none could be decoded", .path.display())]
    Undecodable { path: PathBuf, grids: usize },
    #[error("QR code in {} does not hold a setup payload", .path.display())]
    Payload {
        path: PathBuf,
        #[source]
        error: PayloadError,
    },
}

/// Decode the first readable QR code in an image file into a setup payload
pub fn decode_qr_image<P: AsRef<Path>>(path: P) -> Result<SetupPayload, QrDecodeError> {
    let path = path.as_ref();
    let img = image::open(path)
        .map_err(|e| QrDecodeError::Open {
            path: path.to_owned(),
            error: Box::new(e),
        })?
        .to_luma8();

    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
        img.width() as usize,
        img.height() as usize,
        |x, y| img.get_pixel(x as u32, y as u32).0[0],
    );
    let grids = prepared.detect_grids();
    if grids.is_empty() {
        return Err(QrDecodeError::NoQrCode {
            path: path.to_owned(),
        });
    }

    for grid in grids.iter() {
        match grid.decode() {
            Ok((_meta, content)) => {
                debug!(path = %path.display(), content, "decoded QR code");
                return decode_qr_text(&content).map_err(|error| QrDecodeError::Payload {
                    path: path.to_owned(),
                    error,
                });
            }
            Err(e) => warn!(path = %path.display(), "skipping undecodable QR grid: {e:?}"),
        }
    }

    Err(QrDecodeError::Undecodable {
        path: path.to_owned(),
        grids: grids.len(),
    })
}

/// Validate payload text taken from a QR code or typed by an operator
pub fn decode_qr_text(text: &str) -> Result<SetupPayload, PayloadError> {
    text.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use qrcodegen::{QrCode, QrCodeEcc};

    const SCALE: u32 = 8;
    const QUIET_ZONE: u32 = 4;

    fn render_qr(text: &str) -> GrayImage {
        let qr = QrCode::encode_text(text, QrCodeEcc::Medium).unwrap();
        let modules = qr.size() as u32;
        let side = (modules + 2 * QUIET_ZONE) * SCALE;
        GrayImage::from_fn(side, side, |x, y| {
            let mx = (x / SCALE) as i32 - QUIET_ZONE as i32;
            let my = (y / SCALE) as i32 - QUIET_ZONE as i32;
            if qr.get_module(mx, my) {
                Luma([0])
            } else {
                Luma([255])
            }
        })
    }

    #[test]
    fn decodes_payload_from_png() {
        let td = tempfile::tempdir().unwrap();
        let path = td.path().join("qr.png");
        render_qr("MT:Y.K9042C00KA0648G00").save(&path).unwrap();

        let payload = decode_qr_image(&path).unwrap();
        assert_eq!(payload.as_str(), "MT:Y.K9042C00KA0648G00");
    }

    #[test]
    fn non_payload_qr_is_rejected() {
        let td = tempfile::tempdir().unwrap();
        let path = td.path().join("qr.png");
        render_qr("https://example.com").save(&path).unwrap();

        let err = decode_qr_image(&path).unwrap_err();
        assert!(matches!(err, QrDecodeError::Payload { .. }));
    }

    #[test]
    fn blank_image_has_no_qr_code() {
        let td = tempfile::tempdir().unwrap();
        let path = td.path().join("blank.png");
        GrayImage::from_pixel(64, 64, Luma([255]))
            .save(&path)
            .unwrap();

        let err = decode_qr_image(&path).unwrap_err();
        assert!(matches!(err, QrDecodeError::NoQrCode { .. }));
    }

    #[test]
    fn missing_image_fails_to_open() {
        let td = tempfile::tempdir().unwrap();
        let err = decode_qr_image(td.path().join("nope.png")).unwrap_err();
        assert!(matches!(err, QrDecodeError::Open { .. }));
    }

    #[test]
    fn text_is_trimmed() {
        assert_eq!(
            decode_qr_text("MT:Y.K9042C00KA0648G00\n").unwrap().as_str(),
            "MT:Y.K9042C00KA0648G00"
        );
    }
}

use crate::utils::error::{CertError, Result};
use image::{imageops, ImageFormat, RgbImage};
use std::io::Cursor;

/// 將簽名放在上方、QR code 放在下方，兩者水平置中，中間不留空隙
pub fn compose(signature: &RgbImage, qr: &RgbImage) -> Result<RgbImage> {
    for (label, img) in [("signature", signature), ("QR", qr)] {
        if img.width() == 0 || img.height() == 0 {
            return Err(CertError::ProcessingError {
                message: format!(
                    "{} image has zero size ({}x{})",
                    label,
                    img.width(),
                    img.height()
                ),
            });
        }
    }

    let width = signature.width().max(qr.width());
    let height = signature.height() + qr.height();

    // zero-filled, uncovered area stays black
    let mut composite = RgbImage::new(width, height);
    imageops::replace(
        &mut composite,
        signature,
        i64::from((width - signature.width()) / 2),
        0,
    );
    imageops::replace(
        &mut composite,
        qr,
        i64::from((width - qr.width()) / 2),
        i64::from(signature.height()),
    );

    Ok(composite)
}

pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}

/// Content sniffing: raw bytes → file extension
use image::ImageFormat;

/// How far into a text file to look for an `<svg` root element
const SVG_SNIFF_LIMIT: usize = 4096;

/// Extension for a recognizable image, `None` otherwise
pub fn extension_of(data: &[u8]) -> Option<&'static str> {
    if let Ok(format) = image::guess_format(data) {
        return raster_extension(format);
    }

    if looks_like_svg(data) {
        return Some("svg");
    }

    None
}

fn raster_extension(format: ImageFormat) -> Option<&'static str> {
    let ext = match format {
        ImageFormat::Png => "png",
        ImageFormat::Jpeg => "jpg",
        ImageFormat::Gif => "gif",
        ImageFormat::WebP => "webp",
        ImageFormat::Bmp => "bmp",
        ImageFormat::Ico => "ico",
        ImageFormat::Tiff => "tiff",
        ImageFormat::Avif => "avif",
        ImageFormat::Qoi => "qoi",
        // Other formats guess_format knows are not useful as note images
        _ => return None,
    };
    Some(ext)
}

fn looks_like_svg(data: &[u8]) -> bool {
    let head = &data[..data.len().min(SVG_SNIFF_LIMIT)];
    let text = match std::str::from_utf8(head) {
        Ok(text) => text,
        // A multi-byte char may be cut at the limit
        Err(e) if e.error_len().is_none() => match std::str::from_utf8(&head[..e.valid_up_to()]) {
            Ok(text) => text,
            Err(_) => return false,
        },
        Err(_) => return false,
    };

    root_element(text.trim_start_matches('\u{feff}'))
        .map(|tag| {
            tag.strip_prefix("<svg")
                .and_then(|rest| rest.chars().next())
                .map_or(false, |c| c.is_whitespace() || matches!(c, '>' | '/' | ':'))
        })
        .unwrap_or(false)
}

/// Text starting at the first element, past the XML declaration,
/// processing instructions, comments and the doctype
fn root_element(mut text: &str) -> Option<&str> {
    loop {
        text = text.trim_start();
        if text.starts_with("<?") {
            text = skip_past(text, "?>")?;
        } else if text.starts_with("<!--") {
            text = skip_past(text, "-->")?;
        } else if text
            .get(..9)
            .map_or(false, |head| head.eq_ignore_ascii_case("<!DOCTYPE"))
        {
            // An internal subset may hold '>' inside brackets
            let end = match (text.find('['), text.find('>')) {
                (Some(open), Some(close)) if open < close => "]>",
                _ => ">",
            };
            text = skip_past(text, end)?;
        } else if text.starts_with('<') {
            return Some(text);
        } else {
            return None;
        }
    }
}

fn skip_past<'a>(text: &'a str, end: &str) -> Option<&'a str> {
    text.find(end).map(|i| &text[i + end.len()..])
}

//! Printable ticket card.

use std::io::Cursor;

use ab_glyph::{FontRef, InvalidFont, PxScale};
use derive_more::{Display, From};
use image::{imageops, DynamicImage, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use serde::Serialize;
use url::Url;

use crate::{config, webhook};

pub const WIDTH: u32 = 400;
pub const HEIGHT: u32 = 640;

const POSTER_HEIGHT: u32 = 220;
const QR_SECTION_TOP: u32 = 440;
const QR_SIZE: u32 = 150;
const BORDER: u32 = 4;

const BACKGROUND: Rgba<u8> = Rgba([0x1a, 0x1a, 0x1a, 0xff]);
const POSTER: Rgba<u8> = Rgba([0x2b, 0x2b, 0x2b, 0xff]);
const GOLD: Rgba<u8> = Rgba([0xff, 0xd7, 0x00, 0xff]);
const WHITE: Rgba<u8> = Rgba([0xff, 0xff, 0xff, 0xff]);
const MUTED: Rgba<u8> = Rgba([0x9e, 0x9e, 0x9e, 0xff]);

const MARGIN: i32 = 24;

/// Vertical position of the attendee name on the raster card.
pub const ATTENDEE_TOP: i32 = 336;

static FONT: &[u8] = include_bytes!("../assets/fonts/DejaVuSans-Bold.ttf");

#[derive(Debug, Display, From)]
pub enum Error {
    #[display("card font unusable: {_0}")]
    Font(InvalidFont),

    #[display("card encoding failed: {_0}")]
    Image(image::ImageError),
}

impl std::error::Error for Error {}

/// Absolute path of the raster card for the ticket of `email`.
pub fn download_path(email: &str) -> String {
    let mut url = Url::parse("http://localhost/").expect("valid literal URL");
    if let Ok(mut path) = url.path_segments_mut() {
        path.clear().extend(["ticket", email, "card.png"]);
    }
    url.path().to_string()
}

/// QR image for `id` from the public rendering service.
pub fn qr_url(config: &config::Qr, id: &webhook::TicketId) -> Url {
    let mut url = config.base_url.clone();
    url.query_pairs_mut()
        .append_pair("size", &format!("{0}x{0}", config.size))
        .append_pair("data", id.as_str());
    url
}

/// Everything the fixed card layout shows.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketCard {
    pub title: String,
    pub date: String,
    pub venue: String,
    pub attendee: String,
    pub serial: webhook::TicketId,
    pub qr_url: String,
}

impl TicketCard {
    pub fn new(
        ticket: webhook::Ticket,
        event: &config::Ticket,
        qr: &config::Qr,
    ) -> Self {
        let qr_url = ticket
            .qr_url
            .unwrap_or_else(|| qr_url(qr, &ticket.id).into());
        Self {
            title: event.title.clone(),
            date: event.date.clone(),
            venue: event.venue.clone(),
            attendee: ticket.name,
            serial: ticket.id,
            qr_url,
        }
    }

    /// Download name of the raster card. Only `[A-Za-z0-9_-]` of the serial
    /// is kept so the name is safe in a `Content-Disposition` header.
    pub fn file_name(&self) -> String {
        let serial = self
            .serial
            .as_str()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect::<String>();
        format!("ticket-{serial}.png")
    }

    /// `download` is the href of the raster card, see [`download_path`].
    pub fn render_html(&self, download: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title} Ticket</title>
<style>
  body {{ background: #1a1a1a; display: flex; justify-content: center; }}
  .ticket {{ width: {WIDTH}px; height: {HEIGHT}px; border: 2px solid #FFD700; }}
  @media print {{ .no-print {{ display: none !important; }} body {{ background: white !important; }} }}
</style>
</head>
<body>
<nav class="no-print">
  <a href="/my-tickets">Back</a>
  <a href="{download}" download="{file_name}">Download Ticket</a>
</nav>
<main class="ticket">
  <h1>{title}</h1>
  <p>DATE: <strong>{date}</strong></p>
  <p>VENUE: <strong>{venue}</strong></p>
  <dl>
    <dt>Attendee Name</dt><dd>{attendee}</dd>
    <dt>Ticket Serial ID</dt><dd>#{serial}</dd>
  </dl>
  <section>
    <img src="{qr_url}" alt="QR Code" width="{QR_SIZE}" height="{QR_SIZE}">
    <p>SCAN FOR ENTRY</p>
  </section>
</main>
</body>
</html>
"#,
            title = escape(&self.title),
            date = escape(&self.date),
            venue = escape(&self.venue),
            attendee = escape(&self.attendee.to_uppercase()),
            serial = escape(&self.serial.as_str().to_uppercase()),
            qr_url = escape(&self.qr_url),
            download = escape(download),
            file_name = escape(&self.file_name()),
        )
    }

    /// Rasterises the card layout with `qr` composited into the QR section.
    pub fn render_png(
        &self,
        qr: &DynamicImage,
    ) -> Result<Vec<u8>, Error> {
        let font = FontRef::try_from_slice(FONT)?;
        let mut canvas = RgbaImage::from_pixel(WIDTH, HEIGHT, BACKGROUND);

        fill(&mut canvas, 0, 0, WIDTH, POSTER_HEIGHT, POSTER);
        let qr_section = HEIGHT - QR_SECTION_TOP;
        fill(&mut canvas, 0, QR_SECTION_TOP, WIDTH, qr_section, GOLD);
        fill(&mut canvas, 0, 0, WIDTH, BORDER, GOLD);
        fill(&mut canvas, 0, HEIGHT - BORDER, WIDTH, BORDER, GOLD);
        fill(&mut canvas, 0, 0, BORDER, HEIGHT, GOLD);
        fill(&mut canvas, WIDTH - BORDER, 0, BORDER, HEIGHT, GOLD);

        let qr = qr
            .resize_exact(QR_SIZE, QR_SIZE, imageops::FilterType::Nearest)
            .to_rgba8();
        let x = (WIDTH - QR_SIZE) / 2;
        let y = QR_SECTION_TOP + (HEIGHT - QR_SECTION_TOP - QR_SIZE) / 2;
        fill(&mut canvas, x - 8, y - 8, QR_SIZE + 16, QR_SIZE + 16, WHITE);
        imageops::overlay(&mut canvas, &qr, i64::from(x), i64::from(y));

        let lines = [
            (GOLD, 40.0_f32, 90, self.title.to_uppercase()),
            (MUTED, 16.0, 236, format!("DATE: {}", self.date)),
            (MUTED, 16.0, 262, format!("VENUE: {}", self.venue)),
            (MUTED, 14.0, 312, "ATTENDEE NAME".to_string()),
            (WHITE, 24.0, ATTENDEE_TOP, self.attendee.to_uppercase()),
            (MUTED, 14.0, 378, "TICKET SERIAL ID".to_string()),
            (GOLD, 20.0, 400, format!("#{}", self.serial).to_uppercase()),
        ];
        for (color, size, top, text) in lines {
            draw_text_mut(
                &mut canvas,
                color,
                MARGIN,
                top,
                PxScale::from(size),
                &font,
                &text,
            );
        }

        let mut png = Vec::new();
        DynamicImage::ImageRgba8(canvas)
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
        Ok(png)
    }
}

/// Page shown when a lookup fails, with a way back to the lookup form.
pub fn render_not_found(message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Ticket not found</title></head>
<body>
<main class="not-found">
  <p class="error">{}</p>
  <a href="/my-tickets">Try Again</a>
</main>
</body>
</html>
"#,
        escape(message),
    )
}

fn fill(
    canvas: &mut RgbaImage,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    color: Rgba<u8>,
) {
    for py in y..(y + height).min(canvas.height()) {
        for px in x..(x + width).min(canvas.width()) {
            canvas.put_pixel(px, py, color);
        }
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

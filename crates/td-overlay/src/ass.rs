//! Minimal ASS (Advanced SubStation Alpha) subtitle-drawing document builder (§4.5.5).
//!
//! Overlays compile down to a handful of styled `Dialogue:` events using vector drawing/move
//! tags instead of plain text, so FFmpeg's `subtitles` filter burns them in as shapes.

use std::fmt::Write as _;

/// One dialogue event, already formatted apart from timing.
#[derive(Debug, Clone)]
pub struct Event {
    pub start_ms: u64,
    pub end_ms: u64,
    pub style: String,
    /// Raw ASS text, including any `{...}` override tags.
    pub text: String,
}

/// A style row in `[V4+ Styles]`.
#[derive(Debug, Clone)]
pub struct Style {
    pub name: String,
    pub font_name: String,
    pub font_size: u32,
    pub primary_colour: String,
    pub outline_colour: String,
    pub back_colour: String,
    pub alignment: u8,
}

impl Style {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            font_name: "Arial".to_string(),
            font_size: 24,
            primary_colour: "&H00FFFFFF".to_string(),
            outline_colour: "&H00000000".to_string(),
            back_colour: "&H00000000".to_string(),
            alignment: 5,
        }
    }

    pub fn with_color(mut self, primary: impl Into<String>) -> Self {
        self.primary_colour = primary.into();
        self
    }

    pub fn with_font_size(mut self, size: u32) -> Self {
        self.font_size = size;
        self
    }
}

/// A full ASS document: script header, one or more styles, and a sequence of events.
#[derive(Debug, Clone)]
pub struct AssDocument {
    pub play_res_x: u32,
    pub play_res_y: u32,
    pub styles: Vec<Style>,
    pub events: Vec<Event>,
}

impl AssDocument {
    pub fn new(play_res_x: u32, play_res_y: u32) -> Self {
        Self {
            play_res_x,
            play_res_y,
            styles: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.styles.push(style);
        self
    }

    pub fn push_event(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Render the full `.ass` document text.
    pub fn render(&self) -> String {
        let mut out = String::new();
        writeln!(out, "[Script Info]").unwrap();
        writeln!(out, "ScriptType: v4.00+").unwrap();
        writeln!(out, "PlayResX: {}", self.play_res_x).unwrap();
        writeln!(out, "PlayResY: {}", self.play_res_y).unwrap();
        writeln!(out).unwrap();

        writeln!(out, "[V4+ Styles]").unwrap();
        writeln!(out, "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding").unwrap();
        for style in &self.styles {
            writeln!(
                out,
                "Style: {},{},{},{},&H000000FF,{},{},-1,0,0,0,100,100,0,0,1,1,0,{},0,0,0,1",
                style.name,
                style.font_name,
                style.font_size,
                style.primary_colour,
                style.outline_colour,
                style.back_colour,
                style.alignment
            )
            .unwrap();
        }
        writeln!(out).unwrap();

        writeln!(out, "[Events]").unwrap();
        writeln!(
            out,
            "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text"
        )
        .unwrap();
        for event in &self.events {
            writeln!(
                out,
                "Dialogue: 0,{},{},{},,0,0,0,,{}",
                format_time(event.start_ms),
                format_time(event.end_ms),
                event.style,
                event.text
            )
            .unwrap();
        }
        out
    }
}

/// `H:MM:SS.CC` (centiseconds), with `0` at the export range start (§4.5.5).
pub fn format_time(ms: u64) -> String {
    let total_cs = ms / 10;
    let cs = total_cs % 100;
    let total_seconds = total_cs / 100;
    let seconds = total_seconds % 60;
    let total_minutes = total_seconds / 60;
    let minutes = total_minutes % 60;
    let hours = total_minutes / 60;
    format!("{hours}:{minutes:02}:{seconds:02}.{cs:02}")
}

/// Convert `#RRGGBB`/`RRGGBB` into ASS's `&HAABBGGRR` color form (opaque, alpha `00`).
pub fn rgb_to_ass_color(hex: &str) -> Option<String> {
    let value = hex.trim().trim_start_matches('#');
    if value.len() != 6 {
        return None;
    }
    let rr = u8::from_str_radix(&value[0..2], 16).ok()?;
    let gg = u8::from_str_radix(&value[2..4], 16).ok()?;
    let bb = u8::from_str_radix(&value[4..6], 16).ok()?;
    Some(format!("&H00{bb:02X}{gg:02X}{rr:02X}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_time_with_centiseconds() {
        assert_eq!(format_time(0), "0:00:00.00");
        assert_eq!(format_time(1_234), "0:00:01.23");
        assert_eq!(format_time(61_000), "0:01:01.00");
    }

    #[test]
    fn converts_hex_to_ass_bgr() {
        assert_eq!(rgb_to_ass_color("#FF0000").unwrap(), "&H000000FF");
        assert_eq!(rgb_to_ass_color("00FF00").unwrap(), "&H0000FF00");
    }

    #[test]
    fn render_emits_required_sections() {
        let mut doc = AssDocument::new(1920, 1080).with_style(Style::new("Dash"));
        doc.push_event(Event {
            start_ms: 0,
            end_ms: 1000,
            style: "Dash".to_string(),
            text: "{\\an5}hello".to_string(),
        });
        let rendered = doc.render();
        assert!(rendered.contains("[Script Info]"));
        assert!(rendered.contains("[V4+ Styles]"));
        assert!(rendered.contains("[Events]"));
        assert!(rendered.contains("Dialogue: 0,0:00:00.00,0:00:10.00,Dash") == false);
        assert!(rendered.contains("Dialogue: 0,0:00:00.00,0:00:01.00,Dash"));
    }
}

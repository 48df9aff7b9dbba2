//! Date/time burn-in overlay: shown when the dashboard is disabled and `includeTimestamp` is set
//! (§4.5.5). Unlike the dashboard and minimap, this is a single static event per export — the wall
//! clock advances continuously, so there is nothing to event-minimize.

use td_models::{TimestampDateFormat, TimestampTimeFormat};

use crate::ass::{AssDocument, Event, Style};

#[derive(Debug, Clone)]
pub struct TimestampOptions {
    pub date_format: TimestampDateFormat,
    pub time_format: TimestampTimeFormat,
    pub canvas_w: u32,
    pub canvas_h: u32,
}

fn format_date(date: chrono::NaiveDate, format: TimestampDateFormat) -> String {
    match format {
        TimestampDateFormat::Mdy => date.format("%m/%d/%Y").to_string(),
        TimestampDateFormat::Dmy => date.format("%d/%m/%Y").to_string(),
        TimestampDateFormat::Ymd => date.format("%Y-%m-%d").to_string(),
    }
}

fn format_clock(time: chrono::NaiveTime, format: TimestampTimeFormat) -> String {
    match format {
        TimestampTimeFormat::H12 => time.format("%I:%M:%S %p").to_string(),
        TimestampTimeFormat::H24 => time.format("%H:%M:%S").to_string(),
    }
}

/// Compile a continuously-advancing wall-clock burn-in starting at `wall_clock_start`, spanning
/// `duration_ms`. One event per whole second so the displayed clock actually ticks.
pub fn compile_timestamp(
    wall_clock_start: chrono::NaiveDateTime,
    duration_ms: u64,
    options: &TimestampOptions,
) -> AssDocument {
    let mut doc = AssDocument::new(options.canvas_w, options.canvas_h)
        .with_style(Style::new("Timestamp").with_color("&H00FFFFFF"));

    let whole_seconds = duration_ms / 1000 + 1;
    for second in 0..whole_seconds {
        let start_ms = second * 1000;
        let end_ms = ((second + 1) * 1000).min(duration_ms.max(start_ms + 1));
        if start_ms >= end_ms {
            continue;
        }
        let at = wall_clock_start + chrono::Duration::seconds(second as i64);
        let text = format!(
            "{} {}",
            format_date(at.date(), options.date_format),
            format_clock(at.time(), options.time_format)
        );
        doc.push_event(Event {
            start_ms,
            end_ms,
            style: "Timestamp".to_string(),
            text: format!("{{\\an1\\pos(20,{})}}{}", options.canvas_h as i64 - 20, text),
        });
    }

    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn options() -> TimestampOptions {
        TimestampOptions {
            date_format: TimestampDateFormat::Ymd,
            time_format: TimestampTimeFormat::H24,
            canvas_w: 1920,
            canvas_h: 1080,
        }
    }

    #[test]
    fn emits_one_event_per_second() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let doc = compile_timestamp(start, 3500, &options());
        assert_eq!(doc.events.len(), 4);
    }

    #[test]
    fn clock_advances_across_events() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(8, 0, 59)
            .unwrap();
        let doc = compile_timestamp(start, 2000, &options());
        assert_ne!(doc.events[0].text, doc.events[1].text);
    }
}

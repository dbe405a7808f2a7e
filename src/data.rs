//! Loading event hierarchies from disk.
//!
//! Two inputs are understood: JSON files holding [`EventSpec`] trees, and
//! measureme `.mm_profdata` self-profiles, where each thread becomes a root
//! and events are nested by interval containment.

use crate::error::{Error, Result};
use crate::tree::{EventSpec, HexColor};
use analyzeme::ProfilingData;
use rayon::prelude::*;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

const NS_PER_MS: f64 = 1_000_000.0;

/// JSON files may be a bare array of roots or an object wrapping one.
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonInput {
    Roots(Vec<EventSpec>),
    Wrapped { events: Vec<EventSpec> },
}

pub fn parse_json(text: &str) -> Result<Vec<EventSpec>> {
    let roots = match serde_json::from_str(text)? {
        JsonInput::Roots(roots) => roots,
        JsonInput::Wrapped { events } => events,
    };
    Ok(roots)
}

/// Load a hierarchy, picking the format from the file extension.
pub fn load(path: &Path) -> Result<Vec<EventSpec>> {
    let extension = path.extension().and_then(|ext| ext.to_str());
    let roots = match extension {
        Some("json") => parse_json(&std::fs::read_to_string(path)?)?,
        Some("mm_profdata") => load_profile(path)?,
        _ => return Err(Error::UnsupportedFormat(path.to_path_buf())),
    };
    log::info!("loaded {} root events from {}", roots.len(), path.display());
    Ok(roots)
}

/// One interval of a profile, in nanoseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileInterval {
    pub label: String,
    pub kind: String,
    pub start_ns: u64,
    pub end_ns: u64,
    pub additional_data: Vec<String>,
}

pub fn load_profile(path: &Path) -> Result<Vec<EventSpec>> {
    let stem = path.with_extension("");

    let data = ProfilingData::new(&stem).map_err(|e| Error::Profile {
        path: stem.clone(),
        message: e.to_string(),
    })?;

    let metadata = data.metadata();
    log::info!(
        "profile of `{}` (pid {})",
        metadata.cmd,
        metadata.process_id
    );

    let mut threads: HashMap<u64, Vec<ProfileInterval>> = HashMap::new();
    for lightweight_event in data.iter() {
        let event = data.to_full_event(&lightweight_event);

        if let analyzeme::EventPayload::Timestamp(analyzeme::Timestamp::Interval { start, end }) =
            &event.payload
        {
            let start_ns = start
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos() as u64;
            let end_ns = end
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos() as u64;

            threads
                .entry(event.thread_id as u64)
                .or_default()
                .push(ProfileInterval {
                    label: event.label.to_string(),
                    kind: event.event_kind.to_string(),
                    start_ns,
                    end_ns: end_ns.max(start_ns),
                    additional_data: event.additional_data.iter().map(|s| s.to_string()).collect(),
                });
        }
    }

    Ok(build_thread_roots(threads))
}

/// Turn per-thread intervals into one root per thread, with times in
/// milliseconds relative to the earliest event.
pub fn build_thread_roots(threads: HashMap<u64, Vec<ProfileInterval>>) -> Vec<EventSpec> {
    let origin_ns = threads
        .values()
        .flatten()
        .map(|interval| interval.start_ns)
        .min()
        .unwrap_or(0);

    let kinds: BTreeSet<&str> = threads
        .values()
        .flatten()
        .map(|interval| interval.kind.as_str())
        .collect();
    let palette = kind_palette(&kinds);

    let mut roots: Vec<(u64, EventSpec)> = threads
        .into_par_iter()
        .map(|(thread_id, intervals)| {
            let children = nest_intervals(thread_id, intervals, origin_ns, &palette);
            let start = children.iter().map(|c| c.start).fold(f64::INFINITY, f64::min);
            let end = children.iter().map(|c| c.end).fold(f64::NEG_INFINITY, f64::max);
            let mut root = EventSpec::new(
                format!("thread-{thread_id}"),
                if start.is_finite() { start } else { 0.0 },
                if end.is_finite() { end } else { 0.0 },
            )
            .text(format!("Thread {thread_id}"));
            root.children = children;
            (thread_id, root)
        })
        .collect();

    roots.sort_by_key(|(thread_id, _)| *thread_id);
    roots.into_iter().map(|(_, root)| root).collect()
}

/// Nest one thread's intervals by containment: an interval becomes a child
/// of the innermost earlier interval that has not ended before it starts.
fn nest_intervals(
    thread_id: u64,
    mut intervals: Vec<ProfileInterval>,
    origin_ns: u64,
    palette: &HashMap<String, HexColor>,
) -> Vec<EventSpec> {
    // Longer intervals first on equal starts so parents precede children.
    intervals.sort_by(|a, b| a.start_ns.cmp(&b.start_ns).then(b.end_ns.cmp(&a.end_ns)));

    let to_ms = |ns: u64| ns.saturating_sub(origin_ns) as f64 / NS_PER_MS;

    let mut roots = Vec::new();
    let mut open: Vec<(u64, EventSpec)> = Vec::new();
    for (position, interval) in intervals.into_iter().enumerate() {
        while open
            .last()
            .is_some_and(|(end_ns, _)| *end_ns <= interval.start_ns)
        {
            close_innermost(&mut open, &mut roots);
        }

        let text = if interval.additional_data.is_empty() {
            interval.label.clone()
        } else {
            format!("{} ({})", interval.label, interval.additional_data.join(", "))
        };
        let mut spec = EventSpec::new(
            format!("t{thread_id}-{position}"),
            to_ms(interval.start_ns),
            to_ms(interval.end_ns),
        )
        .text(text);
        spec.value = Some((interval.end_ns - interval.start_ns) as f64 / NS_PER_MS);
        spec.color = palette.get(&interval.kind).copied();
        open.push((interval.end_ns, spec));
    }
    while !open.is_empty() {
        close_innermost(&mut open, &mut roots);
    }
    roots
}

fn close_innermost(open: &mut Vec<(u64, EventSpec)>, roots: &mut Vec<EventSpec>) {
    if let Some((_, done)) = open.pop() {
        match open.last_mut() {
            Some((_, parent)) => parent.children.push(done),
            None => roots.push(done),
        }
    }
}

/// Evenly spaced hues, starting at green, one per event kind.
fn kind_palette(kinds: &BTreeSet<&str>) -> HashMap<String, HexColor> {
    let step = 360.0 / kinds.len().max(1) as f32;
    kinds
        .iter()
        .enumerate()
        .map(|(i, kind)| {
            let hue = (120.0 + i as f32 * step) % 360.0;
            (kind.to_string(), color_from_hsl(hue, 0.35, 0.8))
        })
        .collect()
}

pub fn color_from_hsl(hue: f32, saturation: f32, lightness: f32) -> HexColor {
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let sector = hue / 60.0;
    let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = lightness - chroma / 2.0;
    let channel = |v: f32| ((v + m).clamp(0.0, 1.0) * 255.0).round() as u8;
    HexColor([channel(r), channel(g), channel(b)])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interval(label: &str, start_ns: u64, end_ns: u64) -> ProfileInterval {
        ProfileInterval {
            label: label.to_string(),
            kind: "Query".to_string(),
            start_ns,
            end_ns,
            additional_data: Vec::new(),
        }
    }

    fn labels(specs: &[EventSpec]) -> Vec<&str> {
        specs.iter().filter_map(|s| s.text.as_deref()).collect()
    }

    #[test]
    fn parses_bare_and_wrapped_json() {
        let bare = r##"[{"id": "a", "start": 0, "end": 10, "color": "#102030",
                        "children": [{"id": "b", "start": 1, "end": 2, "collapse": true}]}]"##;
        let roots = parse_json(bare).unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].color, Some(HexColor([0x10, 0x20, 0x30])));
        assert!(roots[0].children[0].collapse);

        let wrapped = r#"{"events": [{"id": "a", "start": 0, "end": 1}]}"#;
        assert_eq!(parse_json(wrapped).unwrap()[0].id, "a");
    }

    #[test]
    fn rejects_bad_json() {
        assert!(parse_json(r#"[{"id": "a"}]"#).is_err());
        assert!(parse_json(r#"[{"id": "a", "start": 0, "end": 1, "color": "red"}]"#).is_err());
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let result = load(Path::new("events.csv"));
        assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
    }

    #[test]
    fn nests_intervals_by_containment() {
        let mut threads = HashMap::new();
        threads.insert(
            7,
            vec![
                interval("inner", 2_000_000, 3_000_000),
                interval("outer", 1_000_000, 5_000_000),
                interval("sibling", 3_000_000, 4_000_000),
                interval("later", 6_000_000, 8_000_000),
            ],
        );
        let roots = build_thread_roots(threads);

        assert_eq!(roots.len(), 1);
        let thread = &roots[0];
        assert_eq!(thread.id, "thread-7");
        assert_eq!(labels(&thread.children), ["outer", "later"]);
        assert_eq!(labels(&thread.children[0].children), ["inner", "sibling"]);
        assert_eq!(thread.start, 0.0);
        assert_eq!(thread.end, 7.0);
        assert_eq!(thread.children[1].value, Some(2.0));
    }

    #[test]
    fn equal_starts_put_longer_interval_outside() {
        let mut threads = HashMap::new();
        threads.insert(
            1,
            vec![interval("short", 0, 10), interval("long", 0, 100)],
        );
        let roots = build_thread_roots(threads);
        assert_eq!(labels(&roots[0].children), ["long"]);
        assert_eq!(labels(&roots[0].children[0].children), ["short"]);
    }

    #[test]
    fn threads_are_sorted_and_share_origin() {
        let mut threads = HashMap::new();
        threads.insert(9, vec![interval("b", 4_000_000, 5_000_000)]);
        threads.insert(2, vec![interval("a", 2_000_000, 3_000_000)]);
        let roots = build_thread_roots(threads);
        let ids: Vec<&str> = roots.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["thread-2", "thread-9"]);
        assert_eq!(roots[0].start, 0.0);
        assert_eq!(roots[1].start, 2.0);
    }

    #[test]
    fn event_ids_are_unique_per_thread() {
        let mut threads = HashMap::new();
        threads.insert(1, vec![interval("x", 0, 1), interval("x", 2, 3)]);
        threads.insert(2, vec![interval("x", 0, 1)]);
        let roots = build_thread_roots(threads);
        let mut ids: Vec<&str> = roots
            .iter()
            .flat_map(|r| r.children.iter().map(|c| c.id.as_str()))
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn hsl_primaries() {
        assert_eq!(color_from_hsl(0.0, 1.0, 0.5), HexColor([255, 0, 0]));
        assert_eq!(color_from_hsl(120.0, 1.0, 0.5), HexColor([0, 255, 0]));
        assert_eq!(color_from_hsl(240.0, 1.0, 0.5), HexColor([0, 0, 255]));
        assert_eq!(color_from_hsl(0.0, 0.0, 1.0), HexColor([255, 255, 255]));
    }
}

use anyhow::Result;

use crate::transcribe::Transcript;

/// One line per chunk, in chunk order
pub fn format_as_text(transcript: &Transcript) -> String {
    transcript.text()
}

pub fn format_as_json(transcript: &Transcript) -> Result<String> {
    Ok(serde_json::to_string_pretty(transcript)?)
}

/// One SRT cue per chunk. Chunks with no text are skipped.
pub fn format_as_srt(transcript: &Transcript) -> String {
    let mut srt = String::new();

    for (cue, segment) in transcript
        .segments
        .iter()
        .filter(|segment| !segment.text.is_empty())
        .enumerate()
    {
        srt.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            cue + 1,
            format_srt_timestamp(segment.start_time),
            format_srt_timestamp(segment.end_time),
            segment.text
        ));
    }

    srt
}

/// `HH:MM:SS,mmm`
pub fn format_srt_timestamp(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

use crate::chat::Turn;
use crate::TrackList;

/// Render an answer for the terminal
pub fn render_answer(turn: &Turn) -> String {
    format!("\n{}\n", turn.answer.trim_end())
}

/// Render the whole conversation, question then answer
pub fn render_history(history: &[Turn]) -> String {
    history
        .iter()
        .map(|t| format!("> {}\n{}", t.question, t.answer.trim_end()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Render the caption tracks of a video, marking the one the preference list selects
pub fn render_tracks(tracks: &TrackList, languages: &[String]) -> String {
    if tracks.is_empty() {
        return format!("No transcripts listed for {}", tracks.video_id);
    }

    let selected = tracks.select(languages);
    let mut lines = vec![format!("Found {} transcript(s) for {}:", tracks.len(), tracks.video_id)];

    for track in &tracks.tracks {
        let marker = if selected == Some(track) { "*" } else { " " };
        let kind = if track.is_generated { "auto-generated" } else { "manual" };
        lines.push(format!("{marker} {} ({}) - {kind}", track.language, track.language_code));
    }

    match selected {
        Some(track) => lines.push(format!("\nWould use: {}", track.language_code)),
        None => lines.push(format!("\nNo track matches: {}", languages.join(", "))),
    }

    lines.join("\n")
}

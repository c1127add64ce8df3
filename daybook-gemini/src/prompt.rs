//! Prompt text sent to the model.

use daybook_core::ScheduleRequest;

/// Build the planning prompt for `request`.
///
/// The productivity profile and the longer rule list are only included when
/// the user picked at least one productive period during onboarding.
pub fn build_prompt(request: &ScheduleRequest) -> String {
    let prefs = request
        .preferences
        .as_ref()
        .filter(|p| p.has_productive_hours());

    let mut prompt =
        String::from("You are an intelligent calendar assistant. Schedule the following tasks optimally.\n\n");

    if let Some(prefs) = prefs {
        prompt.push_str("User Productivity Profile:\n");
        prompt.push_str(&format!("- Most productive: {}\n", prefs.productive_hours.join(", ")));
        prompt.push_str(&format!(
            "- Avoid scheduling during: {}\n",
            prefs.unproductive_hours.join(", ")
        ));
        prompt.push_str(&format!("- Preferred session length: {} minutes\n", prefs.session_length));
        prompt.push_str(&format!("- Break length: {} minutes\n\n", prefs.break_length));
    }

    prompt.push_str(&format!(
        "Planning Period: {} to {}\n\n",
        request.start_date, request.end_date
    ));

    if !request.existing_events.is_empty() {
        prompt.push_str("Existing Events (avoid conflicts):\n");
        for event in &request.existing_events {
            prompt.push_str(&format!(
                "- {} {}-{}: {}\n",
                event.date,
                event.start_time.format("%H:%M"),
                event.end_time.format("%H:%M"),
                event.title
            ));
        }
        prompt.push('\n');
    }

    prompt.push_str("Tasks to Schedule:\n");
    for (idx, task) in request.tasks.iter().enumerate() {
        let deadline = task
            .deadline
            .map(|d| d.to_string())
            .unwrap_or_else(|| "none".to_string());
        prompt.push_str(&format!(
            "{}. \"{}\" - {} hours, deadline: {}\n",
            idx + 1,
            task.name,
            task.duration_hours,
            deadline
        ));
        prompt.push_str(&format!(
            "   Type: {}, Flexibility: {}",
            task.task_type, task.flexibility
        ));
        if let Some(preferred) = &task.preferred_time {
            prompt.push_str(&format!(", Preferred time: {}", preferred));
        }
        prompt.push_str(&format!(", Task ID: {}\n", task.id));
    }
    prompt.push('\n');

    match prefs {
        Some(prefs) => {
            prompt.push_str("RULES:\n");
            prompt.push_str("1. Prioritize tasks with closer deadlines\n");
            prompt.push_str("2. Schedule during productive hours when possible\n");
            prompt.push_str(&format!(
                "3. Split long tasks (>3h) into {}h sessions with {}min breaks\n",
                f64::from(prefs.session_length) / 60.0,
                prefs.break_length
            ));
            prompt.push_str("4. For \"daily\" tasks, schedule same time each day\n");
            prompt.push_str("5. For \"oneday\" tasks, only schedule on deadline date\n");
            prompt.push_str("6. For \"fixed\" tasks, use preferred time or suggest alternative\n");
            prompt.push_str("7. Keep titles concise (max 30 chars)\n");
            prompt.push_str("8. Keep descriptions brief (max 50 chars)\n");
            prompt.push_str("9. If deadline is far, distribute work evenly\n");
            prompt.push_str("10. If deadline is near, schedule more intensively\n\n");
        }
        None => {
            prompt.push_str("RULES (No preferences provided):\n");
            prompt.push_str("1. Prioritize tasks with closer deadlines\n");
            prompt.push_str("2. Split long tasks (>3h) into 2h sessions with breaks\n");
            prompt.push_str("3. For \"daily\" tasks, schedule same time each day\n");
            prompt.push_str("4. For \"oneday\" tasks, only schedule on deadline date\n");
            prompt.push_str("5. For \"fixed\" tasks, use preferred time\n");
            prompt.push_str("6. Keep titles concise (max 30 chars)\n");
            prompt.push_str("7. Keep descriptions brief (max 50 chars)\n");
            prompt.push_str("8. Distribute work evenly across available days\n\n");
        }
    }

    prompt.push_str(
        "Output ONLY a valid JSON array with this structure:\n\
         [\n  {\n    \"title\": \"Task name - Part 1\",\n    \"description\": \"Brief description\",\n    \
         \"date\": \"2026-01-21\",\n    \"startTime\": \"09:00\",\n    \"endTime\": \"11:00\",\n    \
         \"taskId\": \"task_id_from_input\"\n  }\n]\n\n",
    );
    prompt.push_str("Return ONLY the JSON array, no other text.");

    prompt
}

use crate::{
    can_start_automated_run, permitted_actions, Action, AppState, ChatEntry, ChatRole, Effect,
    ItemId, Msg, NoticeLevel, RfpRecord, Stage,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::DashboardRequested => {
            if state.loading_items {
                Vec::new()
            } else {
                state.loading_items = true;
                state.mark_dirty();
                vec![Effect::LoadItems]
            }
        }
        Msg::ItemsLoaded(result) => {
            state.loading_items = false;
            match result {
                Ok(items) => {
                    state.items = items;
                    state.items_loaded = true;
                }
                Err(detail) => state.push_failure("Failed to load RFPs", &detail),
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::ScanClicked => {
            if state.scanning {
                Vec::new()
            } else {
                state.scanning = true;
                state.mark_dirty();
                vec![Effect::Scan]
            }
        }
        Msg::ScanCompleted(result) => {
            state.scanning = false;
            state.mark_dirty();
            match result {
                Ok(summary) => {
                    state.push_notice(
                        NoticeLevel::Info,
                        format!("Scan complete! Found {} tenders.", summary.scanned_count),
                    );
                    reload_items(&mut state)
                }
                Err(detail) => {
                    state.push_failure("Scan failed", &detail);
                    Vec::new()
                }
            }
        }
        Msg::ItemSelected(item_id) => select_item(&mut state, item_id),
        Msg::RefreshRequested => match state.selected {
            Some(item_id) => vec![issue_fetch(&mut state, item_id)],
            None => Vec::new(),
        },
        Msg::ItemFetched {
            item_id,
            seq,
            result,
        } => apply_fetch(&mut state, item_id, seq, result),
        Msg::ActionClicked(action) => start_action(&mut state, action),
        Msg::ActionCompleted {
            item_id,
            action,
            result,
        } => {
            if state.busy == Some(action) {
                state.busy = None;
            }
            state.mark_dirty();
            match result {
                Ok(()) if state.selected == Some(item_id) => {
                    vec![issue_fetch(&mut state, item_id)]
                }
                Ok(()) => Vec::new(),
                Err(detail) => {
                    state.push_failure("Agent operation failed", &detail);
                    Vec::new()
                }
            }
        }
        Msg::DownloadCompleted(result) => {
            if state.busy == Some(Action::Download) {
                state.busy = None;
            }
            match result {
                Ok(path) => {
                    state.push_notice(NoticeLevel::Info, format!("Saved proposal to {path}"))
                }
                Err(detail) => state.push_failure("Download failed", &detail),
            }
            Vec::new()
        }
        Msg::AutoRunClicked => {
            let Some(item_id) = state.selected else {
                return (state, Vec::new());
            };
            if state.record.is_none()
                || !can_start_automated_run(current_stage(&state), state.poll.is_active())
            {
                return (state, Vec::new());
            }
            state.poll.start(item_id);
            state.trigger_pending = true;
            state.mark_dirty();
            vec![
                Effect::StartPolling { item_id },
                Effect::TriggerAutoRun { item_id },
            ]
        }
        Msg::AutoRunTriggerCompleted(Ok(())) => {
            state.trigger_pending = false;
            Vec::new()
        }
        Msg::AutoRunTriggerCompleted(Err(detail)) => {
            state.trigger_pending = false;
            let mut effects = Vec::new();
            if state.poll.stop() {
                effects.push(Effect::StopPolling);
            }
            state.push_failure("Failed to trigger automated run", &detail);
            effects
        }
        Msg::WatchRequested => {
            let Some(item_id) = state.selected else {
                return (state, Vec::new());
            };
            if state.record.is_none()
                || current_stage(&state).is_terminal()
                || !state.poll.start(item_id)
            {
                return (state, Vec::new());
            }
            state.mark_dirty();
            vec![Effect::StartPolling { item_id }]
        }
        Msg::StopWatchingClicked => {
            if state.poll.stop() {
                state.mark_dirty();
                vec![Effect::StopPolling]
            } else {
                Vec::new()
            }
        }
        Msg::PollTick => {
            // Ticks queued before a stop are dropped here.
            let Some(item_id) = state.poll.item_id() else {
                return (state, Vec::new());
            };
            if state.poll.in_flight().is_some() {
                return (state, Vec::new());
            }
            let effect = issue_fetch(&mut state, item_id);
            if let Effect::FetchItem { seq, .. } = effect {
                state.poll.mark_in_flight(seq);
            }
            vec![effect]
        }
        Msg::ChatSubmitted(question) => {
            let question = question.trim().to_string();
            let Some(item_id) = state.selected else {
                return (state, Vec::new());
            };
            if question.is_empty() || state.chat_pending {
                return (state, Vec::new());
            }
            state.chat.push(ChatEntry {
                role: ChatRole::User,
                text: question.clone(),
            });
            state.chat_pending = true;
            state.mark_dirty();
            vec![Effect::SendChat { item_id, question }]
        }
        Msg::ChatAnswered(result) => {
            state.chat_pending = false;
            match result {
                Ok(answer) => {
                    state.chat.push(ChatEntry {
                        role: ChatRole::Assistant,
                        text: answer,
                    });
                    state.mark_dirty();
                }
                Err(detail) => state.push_failure("Chat failed", &detail),
            }
            Vec::new()
        }
        Msg::UploadSubmitted(form) => {
            if state.uploading {
                return (state, Vec::new());
            }
            if let Some(field) = form.missing_field() {
                state.push_failure("Upload failed", &format!("missing {field}"));
                return (state, Vec::new());
            }
            state.uploading = true;
            state.mark_dirty();
            vec![Effect::Upload(form)]
        }
        Msg::UploadCompleted(result) => {
            state.uploading = false;
            state.mark_dirty();
            match result {
                Ok(item_id) => {
                    state.push_notice(
                        NoticeLevel::Info,
                        format!("Upload complete: RFP #{item_id}"),
                    );
                    reload_items(&mut state)
                }
                Err(detail) => {
                    state.push_failure("Upload failed", &detail);
                    Vec::new()
                }
            }
        }
    };

    (state, effects)
}

fn current_stage(state: &AppState) -> Stage {
    state
        .record
        .as_ref()
        .map(RfpRecord::stage)
        .unwrap_or_default()
}

fn reload_items(state: &mut AppState) -> Vec<Effect> {
    if state.loading_items {
        return Vec::new();
    }
    state.loading_items = true;
    vec![Effect::LoadItems]
}

fn issue_fetch(state: &mut AppState, item_id: ItemId) -> Effect {
    let seq = state.sequencer.issue();
    state.outstanding_fetches += 1;
    Effect::FetchItem { item_id, seq }
}

fn select_item(state: &mut AppState, item_id: ItemId) -> Vec<Effect> {
    let mut effects = Vec::new();
    if state.selected != Some(item_id) {
        if state.poll.stop() {
            effects.push(Effect::StopPolling);
        }
        state.selected = Some(item_id);
        state.record = state.items.iter().find(|r| r.id == item_id).cloned();
        state.not_found = false;
        state.busy = None;
        state.chat.clear();
        state.chat_pending = false;
        state.mark_dirty();
    }
    effects.push(issue_fetch(state, item_id));
    effects
}

fn apply_fetch(
    state: &mut AppState,
    item_id: ItemId,
    seq: u64,
    result: Result<Option<RfpRecord>, String>,
) -> Vec<Effect> {
    state.outstanding_fetches = state.outstanding_fetches.saturating_sub(1);
    state.poll.settle(seq);

    if state.selected != Some(item_id) {
        return Vec::new();
    }

    // Stale results are dropped whether they succeeded or not.
    if seq <= state.sequencer.last_applied() {
        return Vec::new();
    }
    let record = match result {
        Ok(record) => record,
        Err(detail) => {
            state.push_failure("Refresh failed", &detail);
            return Vec::new();
        }
    };
    state.sequencer.accept(seq);

    let Some(record) = record else {
        if !state.not_found {
            state.not_found = true;
            state.mark_dirty();
        }
        return Vec::new();
    };

    state.not_found = false;
    let terminal = record.stage().is_terminal();
    if state.record.as_ref() != Some(&record) {
        state.record = Some(record);
        state.mark_dirty();
    }

    if terminal && state.poll.stop() {
        state.mark_dirty();
        return vec![Effect::StopPolling];
    }
    Vec::new()
}

fn start_action(state: &mut AppState, action: Action) -> Vec<Effect> {
    let Some(item_id) = state.selected else {
        return Vec::new();
    };
    if state.record.is_none() || state.busy.is_some() {
        return Vec::new();
    }
    if !permitted_actions(current_stage(state), state.poll.is_active()).contains(&action) {
        return Vec::new();
    }
    state.busy = Some(action);
    state.mark_dirty();
    match action {
        Action::Download => vec![Effect::DownloadArtifact { item_id }],
        _ => vec![Effect::RunAction { item_id, action }],
    }
}

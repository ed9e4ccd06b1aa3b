use std::sync::{mpsc, Arc};
use std::time::Duration;

use tracker_core::{Action, Effect, Msg, ScanSummary};
use tracker_engine::{
    EngineConfig, EngineError, EngineEvent, EngineHandle, EventSink, PipelineAction,
    PollController, TokioScheduler, UploadRequest,
};
use tracker_logging::{tracker_debug, tracker_info, tracker_warn};

/// Executes core effects against the engine and owns the poll timer.
pub struct EffectRunner {
    engine: EngineHandle,
    poll: PollController<TokioScheduler>,
    msg_tx: mpsc::Sender<Msg>,
}

impl EffectRunner {
    pub fn new(
        config: EngineConfig,
        poll_interval: Duration,
        msg_tx: mpsc::Sender<Msg>,
    ) -> Result<Self, EngineError> {
        let sink = Arc::new(MsgSink { tx: msg_tx.clone() });
        let engine = EngineHandle::new(config, sink)?;
        let poll = PollController::new(engine.scheduler(), poll_interval);
        Ok(Self {
            engine,
            poll,
            msg_tx,
        })
    }

    pub fn enqueue(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::LoadItems => self.engine.load_items(),
                Effect::Scan => {
                    tracker_info!("Scanning tender portals");
                    self.engine.scan();
                }
                Effect::FetchItem { item_id, seq } => {
                    tracker_debug!("Refresh item_id={} seq={}", item_id, seq);
                    self.engine.fetch_item(item_id, seq);
                }
                Effect::RunAction { item_id, action } => match pipeline_action(action) {
                    Some(step) => self.engine.run_action(item_id, step),
                    None => self.engine.download(item_id),
                },
                Effect::DownloadArtifact { item_id } => self.engine.download(item_id),
                Effect::TriggerAutoRun { item_id } => self.engine.trigger_auto_run(item_id),
                Effect::StartPolling { item_id } => {
                    let tx = self.msg_tx.clone();
                    self.poll.start(item_id, move |_| {
                        let _ = tx.send(Msg::PollTick);
                    });
                }
                Effect::StopPolling => {
                    self.poll.stop();
                }
                Effect::SendChat { item_id, question } => self.engine.chat(item_id, question),
                Effect::Upload(form) => self.engine.upload(UploadRequest {
                    file: form.file,
                    title: form.title,
                    client: form.client,
                    deadline: form.deadline,
                }),
            }
        }
    }
}

struct MsgSink {
    tx: mpsc::Sender<Msg>,
}

impl EventSink for MsgSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(map_event(event));
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::ItemsLoaded(result) => Msg::ItemsLoaded(describe("Load RFPs", result)),
        EngineEvent::ScanCompleted(result) => Msg::ScanCompleted(
            describe("Scan", result).map(|report| ScanSummary {
                scanned_count: report.scanned_count,
            }),
        ),
        EngineEvent::ItemFetched {
            item_id,
            seq,
            result,
        } => Msg::ItemFetched {
            item_id,
            seq,
            result: describe("Refresh", result),
        },
        EngineEvent::ActionCompleted {
            item_id,
            action,
            result,
        } => Msg::ActionCompleted {
            item_id,
            action: map_action(action),
            result: describe("Pipeline step", result),
        },
        EngineEvent::AutoRunTriggered { result, .. } => {
            Msg::AutoRunTriggerCompleted(describe("Automated run trigger", result))
        }
        EngineEvent::ChatAnswered { result, .. } => Msg::ChatAnswered(describe("Chat", result)),
        EngineEvent::UploadCompleted(result) => Msg::UploadCompleted(describe("Upload", result)),
        EngineEvent::ArtifactSaved { result, .. } => Msg::DownloadCompleted(
            describe("Download", result).map(|path| path.display().to_string()),
        ),
    }
}

fn describe<T, E: std::fmt::Display>(operation: &str, result: Result<T, E>) -> Result<T, String> {
    result.map_err(|err| {
        tracker_warn!("{} failed: {}", operation, err);
        err.to_string()
    })
}

fn pipeline_action(action: Action) -> Option<PipelineAction> {
    match action {
        Action::Analyze => Some(PipelineAction::Analyze),
        Action::Price => Some(PipelineAction::Price),
        Action::GenerateProposal => Some(PipelineAction::GenerateProposal),
        Action::Download => None,
    }
}

fn map_action(action: PipelineAction) -> Action {
    match action {
        PipelineAction::Analyze => Action::Analyze,
        PipelineAction::Price => Action::Price,
        PipelineAction::GenerateProposal => Action::GenerateProposal,
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;
    use tracker_engine::{ApiError, FailureKind, ScanReport};

    use super::*;

    #[test]
    fn engine_failures_become_display_strings() {
        let msg = map_event(EngineEvent::ActionCompleted {
            item_id: 4,
            action: PipelineAction::Price,
            result: Err(ApiError::new(FailureKind::Rejected, "RFP not found")),
        });
        assert_eq!(
            msg,
            Msg::ActionCompleted {
                item_id: 4,
                action: Action::Price,
                result: Err("RFP not found".to_string()),
            }
        );
    }

    #[test]
    fn scan_and_download_results_are_translated() {
        assert_eq!(
            map_event(EngineEvent::ScanCompleted(Ok(ScanReport { scanned_count: 5 }))),
            Msg::ScanCompleted(Ok(ScanSummary { scanned_count: 5 }))
        );
        assert_eq!(
            map_event(EngineEvent::ArtifactSaved {
                item_id: 2,
                result: Ok(PathBuf::from("output/proposal_2.pptx")),
            }),
            Msg::DownloadCompleted(Ok("output/proposal_2.pptx".to_string()))
        );
    }

    #[test]
    fn manual_steps_map_both_ways() {
        for action in [Action::Analyze, Action::Price, Action::GenerateProposal] {
            let step = pipeline_action(action).expect("pipeline step");
            assert_eq!(map_action(step), action);
        }
        assert_eq!(pipeline_action(Action::Download), None);
    }
}

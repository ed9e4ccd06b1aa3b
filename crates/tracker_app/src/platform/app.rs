use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::sync::mpsc;

use anyhow::{bail, Context};
use chrono::Local;
use tracker_core::{update, Action, AppState, AppViewModel, Msg, NoticeLevel, UploadForm};
use tracker_logging::tracker_info;

use super::cli::Commands;
use super::config::TrackerConfig;
use super::effects::EffectRunner;
use super::ui::render;

/// One scripted interaction. Steps run only while nothing is outstanding.
#[derive(Debug, Clone, PartialEq)]
enum Step {
    Send(Msg),
    /// Fails unless the selected item has been loaded.
    RequireItem,
    RequireAction(Action),
    RequireAutoRun,
    Confirm(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Dashboard,
    List,
    Detail,
    Chat,
    Nothing,
}

#[derive(Debug)]
struct Plan {
    steps: VecDeque<Step>,
    screen: Screen,
    /// Print a progress line whenever the selected item changes.
    follow: bool,
    max_ticks: Option<u32>,
}

impl Plan {
    fn for_command(command: Commands) -> Self {
        let mut plan = Plan {
            steps: VecDeque::new(),
            screen: Screen::Detail,
            follow: false,
            max_ticks: None,
        };
        let steps = &mut plan.steps;
        match command {
            Commands::Dashboard => {
                steps.push_back(Step::Send(Msg::DashboardRequested));
                plan.screen = Screen::Dashboard;
            }
            Commands::List => {
                steps.push_back(Step::Send(Msg::DashboardRequested));
                plan.screen = Screen::List;
            }
            Commands::Scan => {
                steps.push_back(Step::Send(Msg::ScanClicked));
                plan.screen = Screen::Dashboard;
            }
            Commands::Show { id } => {
                steps.extend([Step::Send(Msg::ItemSelected(id)), Step::RequireItem]);
            }
            Commands::Run { id, step } => {
                let action = Action::from(step);
                steps.extend([
                    Step::Send(Msg::ItemSelected(id)),
                    Step::RequireItem,
                    Step::RequireAction(action),
                    Step::Send(Msg::ActionClicked(action)),
                ]);
            }
            Commands::Autopilot { id, yes, max_ticks } => {
                steps.extend([
                    Step::Send(Msg::ItemSelected(id)),
                    Step::RequireItem,
                    Step::RequireAutoRun,
                ]);
                if !yes {
                    steps.push_back(Step::Confirm(format!(
                        "Start the automated run for RFP #{id}?"
                    )));
                }
                steps.push_back(Step::Send(Msg::AutoRunClicked));
                plan.follow = true;
                plan.max_ticks = max_ticks;
            }
            Commands::Watch { id, max_ticks } => {
                steps.extend([
                    Step::Send(Msg::ItemSelected(id)),
                    Step::RequireItem,
                    Step::Send(Msg::WatchRequested),
                ]);
                plan.follow = true;
                plan.max_ticks = max_ticks;
            }
            Commands::Download { id } => {
                steps.extend([
                    Step::Send(Msg::ItemSelected(id)),
                    Step::RequireItem,
                    Step::RequireAction(Action::Download),
                    Step::Send(Msg::ActionClicked(Action::Download)),
                ]);
                plan.screen = Screen::Nothing;
            }
            Commands::Chat { id, question } => {
                steps.extend([
                    Step::Send(Msg::ItemSelected(id)),
                    Step::RequireItem,
                    Step::Send(Msg::ChatSubmitted(question.join(" "))),
                ]);
                plan.screen = Screen::Chat;
            }
            Commands::Upload {
                file,
                title,
                client,
                deadline,
            } => {
                steps.push_back(Step::Send(Msg::UploadSubmitted(UploadForm {
                    file,
                    title,
                    client,
                    deadline,
                })));
                plan.screen = Screen::Nothing;
            }
        }
        plan
    }
}

/// Owns the state and applies messages one at a time.
struct Session {
    state: AppState,
    runner: EffectRunner,
    follow: bool,
    printed_notices: usize,
    last_progress: Option<String>,
}

impl Session {
    fn dispatch(&mut self, msg: Msg) {
        let (state, effects) = update(std::mem::take(&mut self.state), msg);
        self.state = state;
        self.runner.enqueue(effects);
        if self.state.consume_dirty() {
            let view = self.state.view();
            self.report_changes(&view);
        }
    }

    fn report_changes(&mut self, view: &AppViewModel) {
        for notice in view.notices.iter().skip(self.printed_notices) {
            match notice.level {
                NoticeLevel::Info => println!("{}", render::notice(notice)),
                NoticeLevel::Failure => eprintln!("{}", render::notice(notice)),
            }
        }
        self.printed_notices = view.notices.len();

        if !self.follow {
            return;
        }
        if let Some(detail) = view.detail.as_ref().filter(|detail| detail.loaded) {
            let line = render::progress(detail);
            if self.last_progress.as_ref() != Some(&line) {
                println!("{line}");
                self.last_progress = Some(line);
            }
        }
    }
}

pub fn run_app(command: Commands, config: &TrackerConfig) -> anyhow::Result<()> {
    let Plan {
        mut steps,
        screen,
        follow,
        max_ticks,
    } = Plan::for_command(command);

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let runner = EffectRunner::new(config.engine_config(), config.poll_interval(), msg_tx)
        .context("failed to start the engine")?;
    let mut session = Session {
        state: AppState::new(),
        runner,
        follow,
        printed_notices: 0,
        last_progress: None,
    };
    let mut ticks = 0u32;

    loop {
        if session.state.is_idle() {
            let Some(step) = steps.pop_front() else {
                break;
            };
            match step {
                Step::Send(msg) => session.dispatch(msg),
                Step::Confirm(prompt) => {
                    if !confirm(&prompt)? {
                        println!("Cancelled.");
                        return Ok(());
                    }
                }
                guard => check(&guard, &session.state.view())?,
            }
            continue;
        }

        let msg = msg_rx.recv().context("engine stopped unexpectedly")?;
        if matches!(msg, Msg::PollTick) && session.state.poll().is_active() {
            ticks += 1;
            if let Some(max) = max_ticks.filter(|max| ticks > *max) {
                tracker_info!("Giving up after {} refreshes", max);
                println!("Stopped following after {max} refreshes.");
                session.dispatch(Msg::StopWatchingClicked);
                continue;
            }
        }
        session.dispatch(msg);
    }

    let view = session.state.view();
    print_screen(screen, &view);

    let failures = view
        .notices
        .iter()
        .filter(|notice| notice.level == NoticeLevel::Failure)
        .count();
    if failures > 0 {
        bail!("{failures} operation(s) failed");
    }
    Ok(())
}

fn print_screen(screen: Screen, view: &AppViewModel) {
    let today = Local::now().date_naive();
    match screen {
        Screen::Dashboard if view.items_loaded => println!("{}", render::dashboard(view, today)),
        Screen::List if view.items_loaded => println!("{}", render::item_list(view, today)),
        Screen::Detail => {
            if let Some(detail) = &view.detail {
                println!("{}", render::detail(detail, today));
            }
        }
        Screen::Chat => {
            if !view.chat.is_empty() {
                println!("{}", render::chat(&view.chat));
            }
        }
        _ => {}
    }
}

fn check(guard: &Step, view: &AppViewModel) -> anyhow::Result<()> {
    let Some(detail) = &view.detail else {
        bail!("no RFP selected");
    };
    match guard {
        Step::RequireItem if !detail.loaded => {
            if detail.not_found {
                bail!("RFP #{} not found", detail.id);
            }
            bail!("could not load RFP #{}", detail.id);
        }
        Step::RequireAction(action) if !detail.permitted_actions.contains(action) => {
            if detail.polling {
                bail!("agents are running on RFP #{}", detail.id);
            }
            bail!(
                "{} is not available while RFP #{} is {}",
                action.label(),
                detail.id,
                detail.status
            );
        }
        Step::RequireAutoRun if !detail.can_start_automated_run => {
            bail!(
                "RFP #{} is {}; there is nothing left to automate",
                detail.id,
                detail.status
            );
        }
        _ => Ok(()),
    }
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tracker_core::{RfpRecord, STATUS_NEW, STATUS_READY_TO_SUBMIT};

    use crate::platform::cli::StepArg;
    use super::*;

    fn loaded_state(status: &str) -> AppState {
        let (state, _) = update(AppState::new(), Msg::ItemSelected(7));
        let record = RfpRecord {
            id: 7,
            title: "Road marking paint".to_string(),
            client_name: "PWD".to_string(),
            deadline: "2026-11-01".to_string(),
            status: status.to_string(),
            file_url: None,
            extracted_data: None,
        };
        let (state, _) = update(
            state,
            Msg::ItemFetched {
                item_id: 7,
                seq: 1,
                result: Ok(Some(record)),
            },
        );
        state
    }

    #[test]
    fn run_selects_checks_then_acts() {
        let plan = Plan::for_command(Commands::Run {
            id: 7,
            step: StepArg::Proposal,
        });
        assert_eq!(
            Vec::from(plan.steps),
            vec![
                Step::Send(Msg::ItemSelected(7)),
                Step::RequireItem,
                Step::RequireAction(Action::GenerateProposal),
                Step::Send(Msg::ActionClicked(Action::GenerateProposal)),
            ]
        );
        assert_eq!(plan.screen, Screen::Detail);
        assert!(!plan.follow);
    }

    #[test]
    fn autopilot_asks_first_unless_told_not_to() {
        let asking = Plan::for_command(Commands::Autopilot {
            id: 3,
            yes: false,
            max_ticks: None,
        });
        assert!(asking
            .steps
            .iter()
            .any(|step| matches!(step, Step::Confirm(_))));
        assert!(asking.follow);

        let silent = Plan::for_command(Commands::Autopilot {
            id: 3,
            yes: true,
            max_ticks: Some(5),
        });
        assert!(!silent
            .steps
            .iter()
            .any(|step| matches!(step, Step::Confirm(_))));
        assert_eq!(silent.max_ticks, Some(5));
        assert_eq!(silent.steps.back(), Some(&Step::Send(Msg::AutoRunClicked)));
    }

    #[test]
    fn guards_follow_the_action_gate() {
        let view = loaded_state(STATUS_NEW).view();
        assert!(check(&Step::RequireItem, &view).is_ok());
        assert!(check(&Step::RequireAction(Action::Analyze), &view).is_ok());
        assert!(check(&Step::RequireAutoRun, &view).is_ok());

        let err = check(&Step::RequireAction(Action::Price), &view).unwrap_err();
        assert_eq!(err.to_string(), "price is not available while RFP #7 is New");
    }

    #[test]
    fn finished_item_cannot_be_automated() {
        let view = loaded_state(STATUS_READY_TO_SUBMIT).view();
        assert!(check(&Step::RequireAction(Action::Download), &view).is_ok());
        let err = check(&Step::RequireAutoRun, &view).unwrap_err();
        assert!(err.to_string().contains("nothing left to automate"));
    }

    #[test]
    fn missing_item_fails_the_item_guard() {
        let (state, _) = update(AppState::new(), Msg::ItemSelected(9));
        let (state, _) = update(
            state,
            Msg::ItemFetched {
                item_id: 9,
                seq: 1,
                result: Ok(None),
            },
        );
        let err = check(&Step::RequireItem, &state.view()).unwrap_err();
        assert_eq!(err.to_string(), "RFP #9 not found");
    }
}

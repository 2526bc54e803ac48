use std::future::Future;

use gloo_timers::callback::{Interval, Timeout};
use yew::prelude::*;

use shared::action::ActionOutcome;
use shared::admin::{self, AdminApi, AdminEvent, AdminOutcome, AdminState, AdminSync, Followup, Refresh};
use shared::config::CONFIG;
use shared::models::{Voter, VoterRequest};
use shared::poller::{due_refreshes, POLL_INTERVAL_MS};
use shared::render::{CandidateRow, ElectionCard, PastElectionRow, ResultsView, VoterRow};
use shared::session::View;

use crate::browser;
use crate::render_results::*;
use crate::styles::*;
use crate::transport::BrowserTransport;

enum Dialog {
    Closed,
    StartElection,
    DeleteElection { id: String, title: String },
    EditVoter { original_phone: String, voter: Voter },
    Results(ResultsView),
}

/// Form whose inputs are cleared once its action succeeds.
#[derive(Clone, Copy, PartialEq)]
pub enum Form {
    None,
    Login,
    Election,
    Candidate,
    Voter,
    Spreadsheet,
}

#[derive(Default)]
struct Inputs {
    password: NodeRef,
    election_title: NodeRef,
    election_description: NodeRef,
    start_choice: NodeRef,
    delete_phrase: NodeRef,
    candidate_name: NodeRef,
    candidate_photo: NodeRef,
    voter_name: NodeRef,
    voter_phone: NodeRef,
    voter_roll: NodeRef,
    voter_email: NodeRef,
    edit_name: NodeRef,
    edit_phone: NodeRef,
    edit_roll: NodeRef,
    edit_email: NodeRef,
    spreadsheet: NodeRef,
}

impl Inputs {
    fn clear(&self, form: Form) {
        let fields: Vec<&NodeRef> = match form {
            Form::None => vec![],
            Form::Login => vec![&self.password],
            Form::Election => vec![&self.election_title, &self.election_description],
            Form::Candidate => vec![&self.candidate_name, &self.candidate_photo],
            Form::Voter => vec![&self.voter_name, &self.voter_phone, &self.voter_roll, &self.voter_email],
            Form::Spreadsheet => vec![&self.spreadsheet],
        };
        fields.into_iter().for_each(browser::clear_input);
    }

    fn voter(&self) -> VoterRequest {
        VoterRequest {
            name: browser::input_value(&self.voter_name),
            phone: browser::input_value(&self.voter_phone),
            roll_number: browser::input_value(&self.voter_roll),
            email: browser::input_value(&self.voter_email),
        }
    }

    fn edited_voter(&self) -> VoterRequest {
        VoterRequest {
            name: browser::input_value(&self.edit_name),
            phone: browser::input_value(&self.edit_phone),
            roll_number: browser::input_value(&self.edit_roll),
            email: browser::input_value(&self.edit_email),
        }
    }
}

pub enum Msg {
    Loaded(AdminEvent),
    Tick,
    Settled(AdminOutcome, Form),
    DismissAlert(u32),
    Login,
    Logout,
    CreateElection,
    OpenStartDialog,
    StartElection,
    StopElection,
    OpenDeleteDialog { id: String, title: String },
    DeleteElection,
    ViewResults(String),
    ResultsReady(ActionOutcome<ResultsView>),
    AddCandidate,
    DeleteCandidate { id: String, name: String },
    AddVoter,
    EditVoter(String),
    EditReady(ActionOutcome<Voter>),
    UpdateVoter,
    DeleteVoter { phone: String, name: String },
    UploadVoters,
    CloseDialog,
}

pub struct AdminConsole {
    api: AdminApi<BrowserTransport>,
    state: AdminState,
    dialog: Dialog,
    inputs: Inputs,
    _poller: Interval,
}

impl Component for AdminConsole {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let api = AdminApi::new(BrowserTransport);

        let probe = api.clone();
        ctx.link().send_future(async move { Msg::Loaded(admin::bootstrap(&probe).await) });

        let link = ctx.link().clone();
        let poller = Interval::new(POLL_INTERVAL_MS, move || link.send_message(Msg::Tick));

        Self {
            api,
            state: AdminState::default(),
            dialog: Dialog::Closed,
            inputs: Inputs::default(),
            _poller: poller,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Loaded(event) => {
                let refreshes = self.state.apply(event);
                self.issue(ctx, refreshes);
            }
            Msg::Tick => {
                let due = due_refreshes(self.state.view);
                if due.is_empty() {
                    return false;
                }
                tracing::debug!(count = due.len(), "polling dashboard");
                self.issue(ctx, due.to_vec());
            }
            Msg::Settled(outcome, form) => {
                if outcome.is_success() {
                    self.inputs.clear(form);
                    self.dialog = Dialog::Closed;
                }
                let followup = self.state.absorb(outcome);
                self.follow(ctx, followup);
            }
            Msg::DismissAlert(id) => self.state.alerts.dismiss(id),
            Msg::Login => {
                let secret = browser::input_value(&self.inputs.password);
                self.run(ctx, Form::Login, |api| async move { admin::login(&api, &secret).await });
            }
            Msg::Logout => {
                self.dialog = Dialog::Closed;
                self.run(ctx, Form::None, |api| async move { admin::logout(&api).await });
            }
            Msg::CreateElection => {
                let title = browser::input_value(&self.inputs.election_title);
                let description = browser::input_value(&self.inputs.election_description);
                self.run(ctx, Form::Election, |api| async move {
                    admin::create_election(&api, &title, &description).await
                });
            }
            Msg::OpenStartDialog => self.dialog = Dialog::StartElection,
            Msg::StartElection => {
                let election_id = browser::select_value(&self.inputs.start_choice);
                self.run(ctx, Form::None, |api| async move { admin::start_election(&api, &election_id).await });
            }
            Msg::StopElection => {
                self.run(ctx, Form::None, |api| async move {
                    admin::stop_election(&api, &browser::confirm).await
                });
            }
            Msg::OpenDeleteDialog { id, title } => self.dialog = Dialog::DeleteElection { id, title },
            Msg::DeleteElection => {
                let Dialog::DeleteElection { id, .. } = &self.dialog else {
                    return false;
                };
                let id = id.clone();
                let typed = browser::input_value(&self.inputs.delete_phrase);
                self.run(ctx, Form::None, |api| async move { admin::delete_election(&api, &id, &typed).await });
            }
            Msg::ViewResults(id) => {
                let api = self.api.clone();
                ctx.link().send_future(async move {
                    Msg::ResultsReady(admin::view_election_results(&api, &id).await)
                });
                return false;
            }
            Msg::ResultsReady(outcome) => match outcome {
                ActionOutcome::Succeeded(view) => self.dialog = Dialog::Results(view),
                other => self.absorb_side(ctx, other),
            },
            Msg::AddCandidate => {
                let name = browser::input_value(&self.inputs.candidate_name);
                let photo_url = browser::input_value(&self.inputs.candidate_photo);
                self.run(ctx, Form::Candidate, |api| async move {
                    admin::add_candidate(&api, &name, &photo_url).await
                });
            }
            Msg::DeleteCandidate { id, name } => {
                self.run(ctx, Form::None, |api| async move {
                    admin::delete_candidate(&api, &id, &name, &browser::confirm).await
                });
            }
            Msg::AddVoter => {
                let voter = self.inputs.voter();
                self.run(ctx, Form::Voter, |api| async move { admin::add_voter(&api, &voter).await });
            }
            Msg::EditVoter(phone) => {
                let api = self.api.clone();
                ctx.link().send_future(async move { Msg::EditReady(admin::edit_voter(&api, &phone).await) });
                return false;
            }
            Msg::EditReady(outcome) => match outcome {
                ActionOutcome::Succeeded(voter) => {
                    self.dialog = Dialog::EditVoter { original_phone: voter.phone.clone(), voter };
                }
                other => self.absorb_side(ctx, other),
            },
            Msg::UpdateVoter => {
                let Dialog::EditVoter { original_phone, .. } = &self.dialog else {
                    return false;
                };
                let original_phone = original_phone.clone();
                let voter = self.inputs.edited_voter();
                self.run(ctx, Form::None, |api| async move {
                    admin::update_voter(&api, &original_phone, &voter).await
                });
            }
            Msg::DeleteVoter { phone, name } => {
                self.run(ctx, Form::None, |api| async move {
                    admin::delete_voter(&api, &phone, &name, &browser::confirm).await
                });
            }
            Msg::UploadVoters => {
                let file = browser::selected_file(&self.inputs.spreadsheet);
                self.run(ctx, Form::Spreadsheet, |api| async move {
                    match browser::picked_upload(file).await {
                        Ok(upload) => admin::upload_voters(&api, upload).await,
                        Err(_) => ActionOutcome::unreadable_file(),
                    }
                });
            }
            Msg::CloseDialog => self.dialog = Dialog::Closed,
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let on_dismiss = ctx.link().callback(Msg::DismissAlert);
        html! {
            <div class={BG_PAGE}>
                {render_alerts(&self.state.alerts, on_dismiss)}
                {match self.state.view {
                    View::Loading => html! { <div class={CONTAINER_SM}><p class={TEXT_MUTED}>{"Loading..."}</p></div> },
                    View::Login => self.render_login(ctx),
                    View::Dashboard => self.render_dashboard(ctx),
                }}
                {self.render_dialog(ctx)}
            </div>
        }
    }
}

impl AdminConsole {
    fn issue(&mut self, ctx: &Context<Self>, refreshes: Vec<Refresh>) {
        self.state.begin(&refreshes);
        for which in refreshes {
            let api = self.api.clone();
            ctx.link().send_future(async move { Msg::Loaded(admin::refresh(&api, which).await) });
        }
    }

    fn follow(&mut self, ctx: &Context<Self>, followup: Followup) {
        if let Some(id) = followup.alert {
            let link = ctx.link().clone();
            Timeout::new(CONFIG.alert_timeout_ms, move || link.send_message(Msg::DismissAlert(id))).forget();
        }
        if !followup.refreshes.is_empty() {
            self.issue(ctx, followup.refreshes);
        }
    }

    /// Surfaces the alert of a lookup that did not produce a dialog.
    fn absorb_side<T>(&mut self, ctx: &Context<Self>, outcome: ActionOutcome<T>) {
        let followup = self.state.absorb(outcome.map(|_| AdminSync::default()));
        self.follow(ctx, followup);
    }

    fn run<F, Fut>(&self, ctx: &Context<Self>, form: Form, action: F)
    where
        F: FnOnce(AdminApi<BrowserTransport>) -> Fut,
        Fut: Future<Output = AdminOutcome> + 'static,
    {
        let pending = action(self.api.clone());
        ctx.link().send_future(async move { Msg::Settled(pending.await, form) });
    }

    fn render_login(&self, ctx: &Context<Self>) -> Html {
        let onsubmit = ctx.link().callback(|e: SubmitEvent| {
            e.prevent_default();
            Msg::Login
        });
        html! {
            <div class={CARD}>
                <h1 class={HEADING_LG}>{"Admin Login"}</h1>
                <form {onsubmit} class={SPACE_Y_BASE}>
                    <label class={TEXT_LABEL}>{"Admin Password"}</label>
                    <input ref={self.inputs.password.clone()} type="password" class={INPUT_BASE} placeholder="Enter admin password" />
                    <button type="submit" class={button_primary(true)}>{"Login"}</button>
                </form>
            </div>
        }
    }

    fn render_dashboard(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        html! {
            <div class={CONTAINER}>
                <div class={combine_classes(FLEX_BETWEEN, "mb-6")}>
                    <h1 class={HEADING_MD}>{"Election Administration"}</h1>
                    <button class={button(BUTTON_MUTED)} onclick={link.callback(|_| Msg::Logout)}>{"Logout"}</button>
                </div>
                <div class={SPACE_Y_LG}>
                    {self.render_status(ctx)}
                    <section class={CARD_SECTION}>
                        <h2 class={HEADING_SM}>{"Live Results"}</h2>
                        {render_panel(&self.state.results, render_results)}
                    </section>
                    <div class={GRID_COLS_2}>
                        {self.render_election_form(ctx)}
                        {self.render_past_elections(ctx)}
                    </div>
                    {self.render_elections(ctx)}
                    {self.render_candidates(ctx)}
                    {self.render_voters(ctx)}
                </div>
            </div>
        }
    }

    fn render_status(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let active = self.state.status.ready().map_or(false, |panel| panel.is_active());
        html! {
            <section class={CARD_SECTION}>
                <h2 class={HEADING_SM}>{"Election Status"}</h2>
                {render_panel(&self.state.status, render_status_panel)}
                <div class="flex gap-3 mt-3">
                    if active {
                        <button class={button(BUTTON_DANGER)} onclick={link.callback(|_| Msg::StopElection)}>{"Stop Election"}</button>
                    } else {
                        <button class={button(BUTTON_SUCCESS)} onclick={link.callback(|_| Msg::OpenStartDialog)}>{"Start Election"}</button>
                    }
                </div>
            </section>
        }
    }

    fn render_election_form(&self, ctx: &Context<Self>) -> Html {
        let onsubmit = ctx.link().callback(|e: SubmitEvent| {
            e.prevent_default();
            Msg::CreateElection
        });
        html! {
            <section class={CARD_SECTION}>
                <h2 class={HEADING_SM}>{"Create Election"}</h2>
                <form {onsubmit} class={SPACE_Y_BASE}>
                    <div class={INPUT_GROUP}>
                        <label class={TEXT_LABEL}>{"Title"}</label>
                        <input ref={self.inputs.election_title.clone()} class={INPUT_BASE} />
                    </div>
                    <div class={INPUT_GROUP}>
                        <label class={TEXT_LABEL}>{"Description"}</label>
                        <input ref={self.inputs.election_description.clone()} class={INPUT_BASE} />
                    </div>
                    <button type="submit" class={button_primary(false)}>{"Create Election"}</button>
                </form>
            </section>
        }
    }

    fn render_past_elections(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link().clone();
        html! {
            <section class={CARD_SECTION}>
                <h2 class={HEADING_SM}>{"Past Elections"}</h2>
                {render_panel(&self.state.past_elections, |past| html! {
                    <>
                        {render_listing(&past.rows, |row: &PastElectionRow| {
                            let id = row.id.clone();
                            html! {
                                <div class={FLEX_BETWEEN}>
                                    <div>
                                        <div class="text-gray-200 break-words">{&row.title}</div>
                                        <div class={TEXT_MUTED}>{format!("{} · {} votes", row.ended, row.total_votes)}</div>
                                    </div>
                                    <button class={button(BUTTON_PRIMARY)} onclick={link.callback(move |_| Msg::ViewResults(id.clone()))}>
                                        {"View Details"}
                                    </button>
                                </div>
                            }
                        })}
                        {past_elections_note(past.truncated)}
                    </>
                })}
            </section>
        }
    }

    fn render_elections(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link().clone();
        html! {
            <section class={CARD_SECTION}>
                <h2 class={HEADING_SM}>{"All Elections"}</h2>
                {render_panel(&self.state.election_cards, |cards| render_listing(cards, |card: &ElectionCard| {
                    let view_id = card.id.clone();
                    let delete = (card.id.clone(), card.title.clone());
                    html! {
                        <div class={combine_classes(FLEX_BETWEEN, "border-b border-gray-700 pb-3")}>
                            <div>
                                <div class="font-semibold text-gray-100 break-words">{&card.title}</div>
                                <div class={TEXT_MUTED}>{&card.description}</div>
                                <div class={TEXT_LABEL_SM}>
                                    {format!(
                                        "{} · created {}{}{}",
                                        card.status.label(),
                                        card.created.as_deref().unwrap_or("-"),
                                        card.ended.as_deref().map(|e| format!(" · ended {}", e)).unwrap_or_default(),
                                        card.total_votes.map(|v| format!(" · {} votes", v)).unwrap_or_default(),
                                    )}
                                </div>
                            </div>
                            <div class="flex gap-2">
                                if card.can_view_results {
                                    <button class={button(BUTTON_PRIMARY)} onclick={link.callback(move |_| Msg::ViewResults(view_id.clone()))}>
                                        {"View Results"}
                                    </button>
                                }
                                if card.can_delete {
                                    <button class={button(BUTTON_DANGER)} onclick={link.callback(move |_| Msg::OpenDeleteDialog {
                                        id: delete.0.clone(),
                                        title: delete.1.clone(),
                                    })}>
                                        {"Delete"}
                                    </button>
                                }
                            </div>
                        </div>
                    }
                }))}
            </section>
        }
    }

    fn render_candidates(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link().clone();
        let onsubmit = ctx.link().callback(|e: SubmitEvent| {
            e.prevent_default();
            Msg::AddCandidate
        });
        html! {
            <section class={CARD_SECTION}>
                <h2 class={HEADING_SM}>{"Candidates"}</h2>
                <form {onsubmit} class="flex flex-col md:flex-row gap-3 mb-4">
                    <input ref={self.inputs.candidate_name.clone()} class={INPUT_BASE} placeholder="Candidate name" />
                    <input ref={self.inputs.candidate_photo.clone()} class={INPUT_BASE} placeholder="Photo URL (optional)" />
                    <button type="submit" class={button(BUTTON_SUCCESS)}>{"Add"}</button>
                </form>
                {render_panel(&self.state.candidates, |rows| render_listing(rows, |row: &CandidateRow| {
                    let target = (row.id.clone(), row.name.clone());
                    html! {
                        <div class={FLEX_BETWEEN}>
                            <div class="flex items-center gap-3">
                                {render_photo(row.photo.as_deref(), &row.name)}
                                <span class="text-gray-100 break-words">{&row.name}</span>
                            </div>
                            <button class={button(BUTTON_DANGER)} onclick={link.callback(move |_| Msg::DeleteCandidate {
                                id: target.0.clone(),
                                name: target.1.clone(),
                            })}>
                                {"Delete"}
                            </button>
                        </div>
                    }
                }))}
            </section>
        }
    }

    fn render_voters(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link().clone();
        let onsubmit = ctx.link().callback(|e: SubmitEvent| {
            e.prevent_default();
            Msg::AddVoter
        });
        html! {
            <section class={CARD_SECTION}>
                <h2 class={HEADING_SM}>{"Voters"}</h2>
                <form {onsubmit} class="grid grid-cols-1 md:grid-cols-5 gap-3 mb-4">
                    <input ref={self.inputs.voter_name.clone()} class={INPUT_BASE} placeholder="Name" />
                    <input ref={self.inputs.voter_phone.clone()} class={INPUT_BASE} placeholder="Phone" />
                    <input ref={self.inputs.voter_roll.clone()} class={INPUT_BASE} placeholder="Roll number" />
                    <input ref={self.inputs.voter_email.clone()} type="email" class={INPUT_BASE} placeholder="Email" />
                    <button type="submit" class={button(BUTTON_SUCCESS)}>{"Add Voter"}</button>
                </form>
                <div class="flex items-center gap-3 mb-4">
                    <input ref={self.inputs.spreadsheet.clone()} type="file" accept=".xlsx,.xls" class={TEXT_MUTED} />
                    <button class={button(BUTTON_PRIMARY)} onclick={link.callback(|_| Msg::UploadVoters)}>{"Import Voters"}</button>
                </div>
                {render_panel(&self.state.voters, |rows| render_listing(rows, |row: &VoterRow| {
                    let edit_phone = row.phone.clone();
                    let target = (row.phone.clone(), row.name.clone());
                    html! {
                        <div class={combine_classes(FLEX_BETWEEN, "border-b border-gray-700 pb-2")}>
                            <div>
                                <div class="text-gray-100 break-words">{&row.name}{if row.has_photo { " 📷" } else { "" }}</div>
                                <div class={TEXT_MUTED}>{format!("{} · {} · {}", row.roll_number, row.phone, row.email)}</div>
                            </div>
                            <div class="flex items-center gap-2">
                                <span class={if row.has_voted { "text-green-300 text-sm" } else { "text-gray-400 text-sm" }}>
                                    {row.voted_label()}
                                </span>
                                <button class={button(BUTTON_WARNING)} onclick={link.callback(move |_| Msg::EditVoter(edit_phone.clone()))}>
                                    {"Edit"}
                                </button>
                                <button class={button(BUTTON_DANGER)} onclick={link.callback(move |_| Msg::DeleteVoter {
                                    phone: target.0.clone(),
                                    name: target.1.clone(),
                                })}>
                                    {"Delete"}
                                </button>
                            </div>
                        </div>
                    }
                }))}
            </section>
        }
    }

    fn render_dialog(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let close = link.callback(|_| Msg::CloseDialog);
        let body = match &self.dialog {
            Dialog::Closed => return html! {},
            Dialog::StartElection => {
                let startable = self.state.startable_elections();
                html! {
                    <>
                        <h3 class={HEADING_SM}>{"Start Election"}</h3>
                        if startable.is_empty() {
                            <p class={TEXT_MUTED}>{"No elections available to start. Create one first."}</p>
                        } else {
                            <select ref={self.inputs.start_choice.clone()} class={INPUT_BASE}>
                                <option value="">{"Select an election"}</option>
                                {for startable.iter().map(|e| html! {
                                    <option value={e.id.clone()}>{&e.title}</option>
                                })}
                            </select>
                        }
                        <div class="flex justify-end gap-3">
                            <button class={button(BUTTON_MUTED)} onclick={close}>{"Cancel"}</button>
                            <button class={button(BUTTON_SUCCESS)} onclick={link.callback(|_| Msg::StartElection)}>{"Start"}</button>
                        </div>
                    </>
                }
            }
            Dialog::DeleteElection { title, .. } => html! {
                <>
                    <h3 class={HEADING_SM}>{"Delete Election"}</h3>
                    <p class="text-gray-300">
                        {"This permanently deletes "}<strong>{title}</strong>{" with all its candidates and votes."}
                    </p>
                    <label class={TEXT_LABEL}>{format!("Type {} to confirm", shared::validation::DELETE_CONFIRMATION_PHRASE)}</label>
                    <input ref={self.inputs.delete_phrase.clone()} class={INPUT_BASE} />
                    <div class="flex justify-end gap-3">
                        <button class={button(BUTTON_MUTED)} onclick={close}>{"Cancel"}</button>
                        <button class={button(BUTTON_DANGER)} onclick={link.callback(|_| Msg::DeleteElection)}>{"Delete"}</button>
                    </div>
                </>
            },
            Dialog::EditVoter { voter, .. } => html! {
                <>
                    <h3 class={HEADING_SM}>{"Edit Voter"}</h3>
                    <input ref={self.inputs.edit_name.clone()} class={INPUT_BASE} value={voter.name.clone()} />
                    <input ref={self.inputs.edit_phone.clone()} class={INPUT_BASE} value={voter.phone.clone()} />
                    <input ref={self.inputs.edit_roll.clone()} class={INPUT_BASE} value={voter.roll_number.clone()} />
                    <input ref={self.inputs.edit_email.clone()} class={INPUT_BASE} value={voter.email.clone()} />
                    <div class="flex justify-end gap-3">
                        <button class={button(BUTTON_MUTED)} onclick={close}>{"Cancel"}</button>
                        <button class={button(BUTTON_PRIMARY)} onclick={link.callback(|_| Msg::UpdateVoter)}>{"Save"}</button>
                    </div>
                </>
            },
            Dialog::Results(view) => html! {
                <>
                    <h3 class={HEADING_SM}>{"Election Results"}</h3>
                    {render_results(view)}
                    <div class="flex justify-end">
                        <button class={button(BUTTON_MUTED)} onclick={close}>{"Close"}</button>
                    </div>
                </>
            },
        };
        html! {
            <div class={MODAL_BACKDROP}>
                <div class={MODAL_PANEL}>{body}</div>
            </div>
        }
    }
}

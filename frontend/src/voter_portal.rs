use gloo_timers::callback::Timeout;
use yew::prelude::*;

use shared::action::ActionOutcome;
use shared::config::CONFIG;
use shared::models::{Candidate, Voter, VoterInfoPayload};
use shared::portal::{self, PortalApi, PortalFollowup, PortalState};
use shared::render::{ballot_choices, voter_card, BallotChoice, PortalBanner, ResultsView};
use shared::session::{ProbeOutcome, View};

use crate::browser;
use crate::identity::{self, AuthWatch};
use crate::render_results::*;
use crate::styles::*;
use crate::transport::BrowserTransport;

pub enum Msg {
    Probed(ProbeOutcome<VoterInfoPayload>),
    SignIn,
    SignInFailed(String),
    Token(String),
    Identity(ActionOutcome<Voter>),
    StatusLoaded(PortalBanner),
    RefreshStatus,
    StartVoting,
    CandidatesLoaded(ActionOutcome<Vec<Candidate>>),
    Select(String),
    Proceed,
    DismissConfirmation,
    ConfirmVote,
    VoteSettled(ActionOutcome<()>),
    CancelVoting,
    ViewResults,
    ResultsLoaded(ActionOutcome<ResultsView>),
    UploadPhoto,
    PhotoSettled(ActionOutcome<Option<String>>),
    Logout,
    LoggedOut(ActionOutcome<()>),
    DismissAlert(u32),
}

pub struct VoterPortal {
    api: PortalApi<BrowserTransport>,
    state: PortalState,
    photo_input: NodeRef,
    signing_in: bool,
    auth_watch: Option<AuthWatch>,
}

impl Component for VoterPortal {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let api = PortalApi::new(BrowserTransport);
        let probe = api.clone();
        ctx.link().send_future(async move { Msg::Probed(portal::bootstrap(&probe).await) });

        Self {
            api,
            state: PortalState::default(),
            photo_input: NodeRef::default(),
            signing_in: false,
            auth_watch: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Probed(outcome) => {
                if self.state.apply_probe(outcome) {
                    self.load_status(ctx);
                } else {
                    self.auth_watch = identity::watch_auth_state(ctx.link().callback(Msg::Token));
                }
            }
            Msg::SignIn => {
                self.signing_in = true;
                self.auth_watch = None;
                ctx.link().send_future(async {
                    match identity::sign_in_with_popup().await {
                        Ok(token) => Msg::Token(token),
                        Err(message) => Msg::SignInFailed(message),
                    }
                });
            }
            Msg::SignInFailed(message) => {
                self.signing_in = false;
                let followup = self.state.absorb_identity(ActionOutcome::Failed(shared::alert::Alert::danger(message)));
                self.follow(ctx, followup);
            }
            Msg::Token(token) => {
                if self.state.session.is_authenticated() {
                    return false;
                }
                let api = self.api.clone();
                ctx.link().send_future(async move { Msg::Identity(portal::verify_identity(&api, &token).await) });
                return false;
            }
            Msg::Identity(outcome) => {
                self.signing_in = false;
                if !outcome.is_success() {
                    wasm_bindgen_futures::spawn_local(identity::sign_out());
                }
                self.auth_watch = None;
                let followup = self.state.absorb_identity(outcome);
                self.follow(ctx, followup);
            }
            Msg::StatusLoaded(banner) => self.state.set_banner(banner),
            Msg::RefreshStatus => {
                let followup = self.state.refresh_requested();
                self.follow(ctx, followup);
            }
            Msg::StartVoting => {
                if !self.state.can_start_voting() {
                    return false;
                }
                let Some(phone) = self.state.phone() else {
                    return false;
                };
                let api = self.api.clone();
                ctx.link().send_future(async move {
                    Msg::CandidatesLoaded(portal::start_voting(&api, &phone).await)
                });
                return false;
            }
            Msg::CandidatesLoaded(outcome) => {
                let followup = self.state.absorb_candidates(outcome);
                self.follow(ctx, followup);
            }
            Msg::Select(id) => {
                let followup = self.state.select(&id);
                self.follow(ctx, followup);
            }
            Msg::Proceed => {
                let followup = self.state.proceed();
                self.follow(ctx, followup);
            }
            Msg::DismissConfirmation => self.state.dismiss_confirmation(),
            Msg::ConfirmVote => {
                let Some((candidate_id, phone)) = self.state.begin_vote() else {
                    return false;
                };
                let api = self.api.clone();
                ctx.link().send_future(async move {
                    Msg::VoteSettled(portal::cast_vote(&api, &candidate_id, &phone).await)
                });
            }
            Msg::VoteSettled(outcome) => {
                let followup = self.state.absorb_vote(outcome);
                self.follow(ctx, followup);
            }
            Msg::CancelVoting => self.state.cancel_voting(),
            Msg::ViewResults => {
                let api = self.api.clone();
                ctx.link().send_future(async move { Msg::ResultsLoaded(portal::view_results(&api).await) });
                return false;
            }
            Msg::ResultsLoaded(outcome) => {
                let followup = self.state.absorb_results(outcome);
                self.follow(ctx, followup);
            }
            Msg::UploadPhoto => {
                let Some(phone) = self.state.phone() else {
                    return false;
                };
                let file = browser::selected_file(&self.photo_input);
                let api = self.api.clone();
                ctx.link().send_future(async move {
                    let outcome = match browser::picked_upload(file).await {
                        Ok(upload) => portal::upload_photo(&api, &phone, upload).await,
                        Err(_) => ActionOutcome::unreadable_file(),
                    };
                    Msg::PhotoSettled(outcome)
                });
                return false;
            }
            Msg::PhotoSettled(outcome) => {
                if outcome.is_success() {
                    browser::clear_input(&self.photo_input);
                }
                let followup = self.state.absorb_photo(outcome);
                self.follow(ctx, followup);
            }
            Msg::Logout => {
                let api = self.api.clone();
                ctx.link().send_future(async move {
                    Msg::LoggedOut(portal::logout(&api, &browser::confirm).await)
                });
                return false;
            }
            Msg::LoggedOut(outcome) => {
                if !outcome.is_success() {
                    return false;
                }
                wasm_bindgen_futures::spawn_local(identity::sign_out());
                self.state.logged_out();
            }
            Msg::DismissAlert(id) => self.state.alerts.dismiss(id),
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class={BG_PAGE}>
                {render_alerts(&self.state.alerts, ctx.link().callback(Msg::DismissAlert))}
                {match self.state.view() {
                    View::Loading => html! { <div class={CONTAINER_SM}><p class={TEXT_MUTED}>{"Checking your session..."}</p></div> },
                    View::Login => self.render_login(ctx),
                    View::Dashboard => self.render_dashboard(ctx),
                }}
            </div>
        }
    }
}

impl VoterPortal {
    fn load_status(&self, ctx: &Context<Self>) {
        match self.state.phone() {
            Some(phone) => {
                let api = self.api.clone();
                ctx.link().send_future(async move {
                    Msg::StatusLoaded(portal::load_election_status(&api, &phone).await)
                });
            }
            None => ctx.link().send_message(Msg::StatusLoaded(PortalBanner::Error)),
        }
    }

    fn follow(&self, ctx: &Context<Self>, followup: PortalFollowup) {
        for id in followup.alerts {
            let link = ctx.link().clone();
            Timeout::new(CONFIG.alert_timeout_ms, move || link.send_message(Msg::DismissAlert(id))).forget();
        }
        if followup.reload_status {
            self.load_status(ctx);
        }
    }

    fn render_login(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class={CARD}>
                <h1 class={HEADING_LG}>{"Voter Portal"}</h1>
                <p class={combine_classes(TEXT_MUTED, "text-center mb-4")}>
                    {"Sign in with the Google account registered for this election."}
                </p>
                <button
                    class={button_primary(true)}
                    disabled={self.signing_in}
                    onclick={ctx.link().callback(|_| Msg::SignIn)}
                >
                    {if self.signing_in { "Signing in..." } else { "Sign in with Google" }}
                </button>
            </div>
        }
    }

    fn render_dashboard(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        html! {
            <div class={CONTAINER}>
                <div class={combine_classes(FLEX_BETWEEN, "mb-6")}>
                    <h1 class={HEADING_MD}>{"Voter Dashboard"}</h1>
                    <div class="flex gap-3">
                        <button class={button(BUTTON_MUTED)} onclick={link.callback(|_| Msg::RefreshStatus)}>{"Refresh"}</button>
                        <button class={button(BUTTON_DANGER)} onclick={link.callback(|_| Msg::Logout)}>{"Logout"}</button>
                    </div>
                </div>
                <div class={SPACE_Y_LG}>
                    {self.render_voter_card(ctx)}
                    {render_banner(&self.state.banner, self.state.can_start_voting(), link.callback(|_| Msg::StartVoting))}
                    if self.state.banner.shows_results() {
                        <button class={button(BUTTON_PRIMARY)} onclick={link.callback(|_| Msg::ViewResults)}>{"View Results"}</button>
                    }
                    {self.render_ballot(ctx)}
                    {match &self.state.results {
                        Some(view) => html! {
                            <section class={CARD_SECTION}>
                                <h2 class={HEADING_SM}>{"Election Results"}</h2>
                                {render_results(view)}
                            </section>
                        },
                        None => html! {},
                    }}
                </div>
                {self.render_confirmation(ctx)}
            </div>
        }
    }

    fn render_voter_card(&self, ctx: &Context<Self>) -> Html {
        let Some(voter) = self.state.session.voter() else {
            return html! {};
        };
        let card = voter_card(voter);
        let photo = self.state.photo_url();
        html! {
            <section class={CARD_SECTION}>
                <div class="flex items-center gap-4">
                    {render_photo(photo.as_deref(), &card.name)}
                    <div>
                        <div class="text-lg font-semibold text-gray-100">{&card.name}</div>
                        <div class={TEXT_MUTED}>{format!("Roll: {}", card.roll_number)}</div>
                        <div class={TEXT_MUTED}>{format!("Phone: {}", card.phone)}</div>
                        <div class={TEXT_MUTED}>{format!("Email: {}", card.email)}</div>
                    </div>
                </div>
                <div class="flex items-center gap-3 mt-4">
                    <input ref={self.photo_input.clone()} type="file" accept="image/*" class={TEXT_MUTED} />
                    <button class={button(BUTTON_PRIMARY)} onclick={ctx.link().callback(|_| Msg::UploadPhoto)}>
                        {"Upload Photo"}
                    </button>
                </div>
            </section>
        }
    }

    fn render_ballot(&self, ctx: &Context<Self>) -> Html {
        if !self.state.flow.is_open() {
            return html! {};
        }
        let link = ctx.link().clone();
        let choices = ballot_choices(self.state.flow.candidates(), self.state.flow.selected());
        html! {
            <section class={CARD_SECTION}>
                <h2 class={HEADING_SM}>{"Cast Your Vote"}</h2>
                {render_listing(&choices, |choice: &BallotChoice| {
                    let id = choice.id.clone();
                    let ring = if choice.selected { "ring-2 ring-green-400" } else { "hover:border-blue-400" };
                    html! {
                        <button
                            type="button"
                            class={combine_classes(CARD_SECTION, &combine_classes("w-full text-left flex items-center gap-4", ring))}
                            onclick={link.callback(move |_| Msg::Select(id.clone()))}
                        >
                            {render_photo(choice.photo.as_deref(), &choice.name)}
                            <span class="text-gray-100 font-medium">{&choice.name}</span>
                            if choice.selected {
                                <span class="ml-auto text-green-300">{"✓ Selected"}</span>
                            }
                        </button>
                    }
                })}
                <div class="flex justify-end gap-3 mt-4">
                    <button class={button(BUTTON_MUTED)} onclick={ctx.link().callback(|_| Msg::CancelVoting)}>{"Cancel"}</button>
                    <button class={button(BUTTON_SUCCESS)} onclick={ctx.link().callback(|_| Msg::Proceed)}>{"Proceed to Vote"}</button>
                </div>
            </section>
        }
    }

    fn render_confirmation(&self, ctx: &Context<Self>) -> Html {
        if !self.state.flow.is_confirming() {
            return html! {};
        }
        let name = self.state.flow.selected_candidate().map(|c| c.name.clone()).unwrap_or_default();
        let submitting = self.state.flow.is_submitting();
        html! {
            <div class={MODAL_BACKDROP}>
                <div class={MODAL_PANEL}>
                    <h3 class={HEADING_SM}>{"Confirm Your Vote"}</h3>
                    <p class="text-gray-300">{"You are voting for "}<strong>{name}</strong>{". This cannot be changed."}</p>
                    <div class="flex justify-end gap-3">
                        <button class={button(BUTTON_MUTED)} disabled={submitting} onclick={ctx.link().callback(|_| Msg::DismissConfirmation)}>
                            {"Back"}
                        </button>
                        <button class={button(BUTTON_SUCCESS)} disabled={submitting} onclick={ctx.link().callback(|_| Msg::ConfirmVote)}>
                            {if submitting { "Submitting..." } else { "Confirm Vote" }}
                        </button>
                    </div>
                </div>
            </div>
        }
    }
}

use yew::prelude::*;

use shared::alert::Alerts;
use shared::render::{
    Listing, PortalBanner, ResultsView, StatusPanel, TallyRow, TallyView, PAST_ELECTIONS_SHOWN,
};
use shared::admin::Panel;

use crate::styles::*;

pub fn render_alerts(alerts: &Alerts, on_dismiss: Callback<u32>) -> Html {
    html! {
        <div class="fixed top-4 right-4 w-96 max-w-full z-50">
            {for alerts.iter().map(|(id, alert)| {
                let onclick = on_dismiss.reform(move |_: MouseEvent| id);
                html! {
                    <div class={alert_style(alert.level)} role="alert">
                        <span class="whitespace-pre-line">{&alert.message}</span>
                        <button type="button" class="font-bold" {onclick}>{"×"}</button>
                    </div>
                }
            })}
        </div>
    }
}

/// Empty lists render their message instead of an empty container.
pub fn render_listing<T>(listing: &Listing<T>, item: impl Fn(&T) -> Html) -> Html {
    match listing {
        Listing::Empty(message) => html! { <p class={TEXT_MUTED}>{*message}</p> },
        Listing::Items(items) => html! {
            <div class={SPACE_Y_BASE}>{for items.iter().map(item)}</div>
        },
    }
}

pub fn render_panel<T>(panel: &Panel<T>, ready: impl FnOnce(&T) -> Html) -> Html {
    match panel {
        Panel::Loading => html! { <p class={TEXT_MUTED}>{"Loading..."}</p> },
        Panel::Failed(message) => html! { <p class={TEXT_ERROR}>{message}</p> },
        Panel::Ready(value) => ready(value),
    }
}

pub fn render_photo(url: Option<&str>, alt: &str) -> Html {
    match url {
        Some(url) => html! { <img src={url.to_string()} alt={alt.to_string()} class={PHOTO} /> },
        None => html! { <div class={PHOTO_PLACEHOLDER}>{"👤"}</div> },
    }
}

fn render_row(row: &TallyRow, total_votes: u64, label: &str) -> Html {
    let width = format!("width: {}%", row.percentage);
    html! {
        <div class={combine_classes(CARD_SECTION, if row.is_leader { "border-green-600" } else { "" })}>
            <div class="flex items-center gap-4">
                {render_photo(row.photo.as_deref(), &row.name)}
                <div class="flex-1">
                    <div class={combine_classes(FLEX_BETWEEN, "mb-2")}>
                        <span class="font-medium text-gray-100 break-words">
                            {&row.name}
                            {if row.is_leader {
                                html! { <span class="ml-2 text-xs text-green-300">{format!("👑 {}", label)}</span> }
                            } else {
                                html! {}
                            }}
                        </span>
                        <span class="text-sm text-blue-200">
                            {format!("{} votes ({}%)", row.votes, row.percentage_label)}
                        </span>
                    </div>
                    <div class={PROGRESS_TRACK} title={format!("{} of {} votes", row.votes, total_votes)}>
                        <div class={progress_bar(row.is_leader)} style={width}></div>
                    </div>
                </div>
            </div>
        </div>
    }
}

fn render_tally(view: &TallyView) -> Html {
    let label = view.label.text();
    html! {
        <div class={SPACE_Y_LG}>
            <div class={GRID_COLS_2}>
                <div class={stats_card(STATS_CARD_INFO)}>
                    <div class="text-3xl font-bold">{view.total_votes}</div>
                    <div class="text-sm">{"Total Votes Cast"}</div>
                </div>
                {match view.leader() {
                    Some(leader) => html! {
                        <div class={stats_card(STATS_CARD_SUCCESS)}>
                            <div class="text-xl font-bold break-words">{&leader.name}</div>
                            <div class="text-sm">{format!("{} ({} votes)", label, leader.votes)}</div>
                        </div>
                    },
                    None => html! {
                        <div class={stats_card(STATS_CARD_MUTED)}>
                            <div class="text-xl font-bold">{view.candidate_count}</div>
                            <div class="text-sm">{"Candidates"}</div>
                        </div>
                    },
                }}
            </div>
            {render_listing(&view.rows, |row| render_row(row, view.total_votes, label))}
            {match &view.election {
                Some(election) => html! {
                    <div class={CARD_SECTION}>
                        <h4 class={HEADING_SM}>{"Election Details"}</h4>
                        <p class="text-gray-300"><strong>{"Title: "}</strong>{&election.title}</p>
                        <p class="text-gray-300"><strong>{"Description: "}</strong>{&election.description}</p>
                        <p class="text-gray-300"><strong>{"Period: "}</strong>{election.period()}</p>
                    </div>
                },
                None => html! {},
            }}
        </div>
    }
}

pub fn render_results(view: &ResultsView) -> Html {
    match view {
        ResultsView::Unavailable(message) => html! {
            <div class={stats_card(STATS_CARD_WARNING)}>{*message}</div>
        },
        ResultsView::Tally(tally) => render_tally(tally),
    }
}

pub fn render_status_panel(panel: &StatusPanel) -> Html {
    let variant = if panel.is_active() { STATS_CARD_SUCCESS } else { STATS_CARD_MUTED };
    html! {
        <div class={stats_card(variant)}>
            <div class="text-lg font-semibold break-words">{panel.title()}</div>
            <div class="text-sm break-words">{panel.description()}</div>
        </div>
    }
}

pub fn render_banner(banner: &PortalBanner, show_vote: bool, on_vote: Callback<MouseEvent>) -> Html {
    match banner {
        PortalBanner::Loading => html! {
            <div class={stats_card(STATS_CARD_MUTED)}>{"Loading election status..."}</div>
        },
        PortalBanner::Voted { title } => html! {
            <div class={combine_classes(&stats_card(STATS_CARD_SUCCESS), "text-center")}>
                <h4 class={HEADING_SM}>{"✅ Vote Recorded Successfully!"}</h4>
                <p>{"Thank you for participating in: "}<strong>{title}</strong></p>
                <small>{"Your vote is secure and anonymous. Results will be available when the election ends."}</small>
            </div>
        },
        PortalBanner::ReadyToVote { title, description, started } => html! {
            <div class={combine_classes(&stats_card(STATS_CARD_INFO), "text-center")}>
                <h4 class={HEADING_SM}>{"🗳️ Ready to Vote!"}</h4>
                <p>{"Election: "}<strong>{title}</strong></p>
                <small class="block">{description}</small>
                {match started {
                    Some(started) => html! { <small class="block mt-1">{format!("Started: {}", started)}</small> },
                    None => html! {},
                }}
                if show_vote {
                    <button class={combine_classes(&button(BUTTON_SUCCESS), "mt-4")} onclick={on_vote}>
                        {"Vote Now"}
                    </button>
                }
            </div>
        },
        PortalBanner::Ended { title, ended } => html! {
            <div class={combine_classes(&stats_card(STATS_CARD_WARNING), "text-center")}>
                <h4 class={HEADING_SM}>{"Election Ended"}</h4>
                <p>{"Last Election: "}<strong>{title}</strong></p>
                {match ended {
                    Some(ended) => html! { <small class="block">{format!("Ended on {}", ended)}</small> },
                    None => html! {},
                }}
                <small class="block">{"View detailed results below"}</small>
            </div>
        },
        PortalBanner::NoElection => html! {
            <div class={combine_classes(&stats_card(STATS_CARD_MUTED), "text-center")}>
                <h4 class={HEADING_SM}>{"No Active Election"}</h4>
                <p>{"Please check back later"}</p>
            </div>
        },
        PortalBanner::Error => html! {
            <div class={stats_card(STATS_CARD_WARNING)}>{"Error loading election status"}</div>
        },
    }
}

pub fn past_elections_note(truncated: bool) -> Html {
    if truncated {
        html! {
            <p class={combine_classes(TEXT_MUTED, "mt-2")}>
                {format!("Showing {} most recent elections", PAST_ELECTIONS_SHOWN)}
            </p>
        }
    } else {
        html! {}
    }
}

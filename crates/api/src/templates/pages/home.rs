use maud::{html, Markup};

use crate::templates::layouts::{base, PageConfig};

pub fn home_page(api_base: &str) -> Markup {
    let config = PageConfig {
        title: "Surf's Up!",
    };

    base(&config, content(api_base))
}

fn content(api_base: &str) -> Markup {
    html! {
        h1 class="title" { "Welcome to the Climate API!" }
        h2 class="subtitle" { "Available Routes:" }

        div class="content" {
            ul {
                li {
                    strong { "Precipitation results: " }
                    a href={ (api_base) "/api/v1.0/precipitation" } { "/api/v1.0/precipitation" }
                }
                li {
                    strong { "Stations: " }
                    a href={ (api_base) "/api/v1.0/stations" } { "/api/v1.0/stations" }
                }
                li {
                    strong { "Temperature observations (past 12 months): " }
                    a href={ (api_base) "/api/v1.0/tobs" } { "/api/v1.0/tobs" }
                }
            }

            p { strong { "For a range of dates (replace date in yyyy-mm-dd format):" } }
            ul {
                li {
                    strong { "Just a start date: " }
                    code { "/api/v1.0/<start>" }
                }
                li {
                    strong { "A start and end date: " }
                    code { "/api/v1.0/<start>/<end>" }
                }
            }

            p {
                a href="/docs" class="button is-link is-light is-small" {
                    "API Docs"
                }
            }
        }
    }
}

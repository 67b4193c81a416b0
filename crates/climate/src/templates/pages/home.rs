use maud::{html, Markup};
use time::Date;

use crate::{
    dates::{format_date, trailing_year_start},
    templates::layouts::{base, PageConfig},
};

const SIMPLE_ROUTES: &[&str] = &[
    "/api/v1.0/precipitation",
    "/api/v1.0/stations",
    "/api/v1.0/tobs",
];

pub fn home_page(api_base: &str, last_date: Option<Date>) -> Markup {
    let config = PageConfig {
        title: "Hawaii Weather Station Data",
        api_base,
    };

    base(&config, content(last_date))
}

fn content(last_date: Option<Date>) -> Markup {
    html! {
        div class="content" {
            p { "Welcome to our Hawaii Weather Station data page. Available routes are:" }
            ul {
                @for route in SIMPLE_ROUTES {
                    li { a href=(route) { (route) } }
                }
                li {
                    code { "/api/v1.0/<start>" } " or " code { "/api/v1.0/<start>/<end>" }
                    p class="ml-5" {
                        "where " code { "<start>" } " and " code { "<end>" }
                        " are dates in the format YYYY-MM-DD"
                    }
                }
            }
            @if let Some(last) = last_date {
                p { "Data is recorded through " strong { (format_date(last)) } "." }
                (examples(last))
            }
        }
    }
}

fn examples(last: Date) -> Markup {
    let open = format!("/api/v1.0/{}", format_date(trailing_year_start(last)));
    let bounded = format!(
        "/api/v1.0/{}/{}",
        format_date(trailing_year_start(last)),
        format_date(last)
    );
    html! {
        p { "Examples:" }
        ul {
            li { a href=(open) { (open) } }
            li { a href=(bounded) { (bounded) } }
        }
    }
}

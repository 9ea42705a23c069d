use axum::{extract::State, response::Html};
use serde_json::json;
use time::OffsetDateTime;
use tracing::instrument;

use crate::{
    activities::repo::Activity,
    auth::extractors::CurrentUser,
    charts::aggregate::{
        day_series, day_window_start, month_series, month_window, week_series, week_window,
        year_series, year_window_start, BucketSeries,
    },
    errors::AppResult,
    state::AppState,
};

// Chart windows select from the whole activities table, not just the
// signed-in user's rows; the charts are site-wide stats.

fn chart_page(state: &AppState, view: &str, title: &str, series: &BucketSeries) -> Html<String> {
    Html(
        state
            .renderer
            .render(view, &json!({ "title": title, "chart": series })),
    )
}

#[instrument(skip(state))]
pub async fn daychart(
    State(state): State<AppState>,
    CurrentUser(_user_id): CurrentUser,
) -> AppResult<Html<String>> {
    let now = OffsetDateTime::now_utc();
    let activities = Activity::started_since(&state.db, day_window_start(now)).await?;
    let series = day_series(&activities);
    Ok(chart_page(&state, "daychart", "Today by hour", &series))
}

#[instrument(skip(state))]
pub async fn weekchart(
    State(state): State<AppState>,
    CurrentUser(_user_id): CurrentUser,
) -> AppResult<Html<String>> {
    let (from, to) = week_window(OffsetDateTime::now_utc());
    let activities = Activity::contained_in(&state.db, from, to).await?;
    let series = week_series(&activities);
    Ok(chart_page(&state, "weekchart", "This week by day", &series))
}

#[instrument(skip(state))]
pub async fn monthchart(
    State(state): State<AppState>,
    CurrentUser(_user_id): CurrentUser,
) -> AppResult<Html<String>> {
    let (from, to) = month_window(OffsetDateTime::now_utc());
    let activities = Activity::started_between(&state.db, from, to).await?;
    let series = month_series(&activities);
    Ok(chart_page(&state, "monthchart", "This year by month", &series))
}

#[instrument(skip(state))]
pub async fn yearchart(
    State(state): State<AppState>,
    CurrentUser(_user_id): CurrentUser,
) -> AppResult<Html<String>> {
    let from = year_window_start(OffsetDateTime::now_utc());
    let activities = Activity::started_since(&state.db, from).await?;
    let series = year_series(&activities);
    Ok(chart_page(&state, "yearchart", "By year", &series))
}

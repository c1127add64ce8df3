//! Category visibility toggling.
//!
//! Visibility changes never touch the event collection, so the event feed
//! does not fire for them. The controller recomputes the month grid itself
//! and pushes both the grid and the category list to the attached sink.

use chrono::NaiveDate;

use crate::category::{Category, CategoryStore};
use crate::error::DaybookResult;
use crate::store::DocumentStore;
use crate::view::{CalendarView, MonthGrid};

/// Whatever draws the calendar.
pub trait ViewSink {
    fn render_month(&mut self, grid: &MonthGrid);
    fn render_categories(&mut self, categories: &[Category]);
}

/// Flip a category's visibility, recompute the grid and re-render.
///
/// On failure nothing is re-rendered and the view keeps its previous grid.
pub async fn toggle<S, V>(
    categories: &mut CategoryStore<S>,
    view: &mut CalendarView,
    today: NaiveDate,
    sink: &mut V,
    category_id: &str,
) -> DaybookResult<Category>
where
    S: DocumentStore,
    V: ViewSink + ?Sized,
{
    let toggled = categories.toggle_visibility(category_id).await?;
    let grid = view.recompute(today, categories.list_all());
    sink.render_month(grid);
    sink.render_categories(categories.list_all());
    Ok(toggled)
}

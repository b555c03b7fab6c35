// UI module exports
pub mod simple;

pub use simple::{
    render_contacts_view,
    render_detail_view,
    render_edit_view,
    render_composer_popup,
    render_alert_popup,
    render_hints,
};

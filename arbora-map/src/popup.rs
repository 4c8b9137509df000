//! Popup Content Renderer
//!
//! Builds the element detail view shown when a marker is clicked. The view
//! only forwards user intent through the supplied callbacks.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use shared::models::{Element, ElementType, TreeType};
use shared::types::ElementId;

/// Callback receiving the element id of a popup action
pub type ElementCallback = Arc<dyn Fn(ElementId) + Send + Sync>;

pub const UNKNOWN_TYPE: &str = "Unknown type";
pub const UNKNOWN_SPECIES: &str = "Unknown species";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupAction {
    AddIncident,
    Delete,
}

impl PopupAction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::AddIncident => "Add incident",
            Self::Delete => "Delete",
        }
    }

    fn css_class(&self) -> &'static str {
        match self {
            Self::AddIncident => "popup-action-incident",
            Self::Delete => "popup-action-delete",
        }
    }
}

/// Read-only element summary plus its action affordances
#[derive(Clone)]
pub struct PopupView {
    pub element_id: ElementId,
    pub title: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    /// `None` when the element carries no tree type
    pub species: Option<String>,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub actions: Vec<PopupAction>,
    on_delete: Option<ElementCallback>,
    on_add_incident: Option<ElementCallback>,
}

impl fmt::Debug for PopupView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PopupView")
            .field("element_id", &self.element_id)
            .field("title", &self.title)
            .field("icon", &self.icon)
            .field("color", &self.color)
            .field("species", &self.species)
            .field("created_at", &self.created_at)
            .field("actions", &self.actions)
            .finish_non_exhaustive()
    }
}

/// Detail view for `element`; missing lookups degrade to placeholders
pub fn render_popup(
    element: &Element,
    tree_types: &[TreeType],
    element_types: &[ElementType],
    on_delete: Option<ElementCallback>,
    on_add_incident: Option<ElementCallback>,
) -> PopupView {
    let element_type = element_types.iter().find(|t| t.id == element.element_type_id);

    let species = element.tree_type_id.map(|tree_type_id| {
        tree_types
            .iter()
            .find(|t| t.id == tree_type_id)
            .map(TreeType::display_name)
            .unwrap_or_else(|| UNKNOWN_SPECIES.to_string())
    });

    let mut actions = Vec::with_capacity(2);
    if on_add_incident.is_some() {
        actions.push(PopupAction::AddIncident);
    }
    if on_delete.is_some() {
        actions.push(PopupAction::Delete);
    }

    PopupView {
        element_id: element.id,
        title: element_type
            .map(|t| t.name.clone())
            .unwrap_or_else(|| UNKNOWN_TYPE.to_string()),
        icon: element_type.and_then(|t| t.icon.clone()),
        color: element_type.and_then(|t| t.color.clone()),
        species,
        description: element.description.clone(),
        created_at: element.created_at,
        actions,
        on_delete,
        on_add_incident,
    }
}

impl PopupView {
    /// Forward `action` to its callback; `false` when none is bound
    pub fn trigger(&self, action: PopupAction) -> bool {
        let callback = match action {
            PopupAction::AddIncident => &self.on_add_incident,
            PopupAction::Delete => &self.on_delete,
        };
        match callback {
            Some(cb) => {
                cb(self.element_id);
                true
            }
            None => false,
        }
    }

    /// Escaped HTML fragment for DOM hosts
    pub fn to_html(&self) -> String {
        let mut html = format!(
            r#"<div class="element-popup" data-element-id="{}">"#,
            self.element_id
        );

        html.push_str(r#"<div class="popup-header">"#);
        if let Some(icon) = &self.icon {
            let style = self
                .color
                .as_deref()
                .map(|c| format!(r#" style="color: {}""#, escape(c)))
                .unwrap_or_default();
            html.push_str(&format!(
                r#"<span class="popup-icon icon-{}"{}></span>"#,
                escape(icon),
                style
            ));
        }
        html.push_str(&format!("<strong>{}</strong></div>", escape(&self.title)));

        if let Some(species) = &self.species {
            html.push_str(&format!(r#"<div class="popup-species">{}</div>"#, escape(species)));
        }
        if let Some(description) = &self.description {
            html.push_str(&format!(r#"<p class="popup-description">{}</p>"#, escape(description)));
        }
        if let Some(created_at) = &self.created_at {
            html.push_str(&format!(
                r#"<div class="popup-date">{}</div>"#,
                created_at.format("%Y-%m-%d")
            ));
        }

        if !self.actions.is_empty() {
            html.push_str(r#"<div class="popup-actions">"#);
            for action in &self.actions {
                html.push_str(&format!(
                    r#"<button class="{}" data-element-id="{}">{}</button>"#,
                    action.css_class(),
                    self.element_id,
                    action.label()
                ));
            }
            html.push_str("</div>");
        }

        html.push_str("</div>");
        html
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

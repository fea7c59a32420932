//! Static Content
//!
//! Feature cards and quick links rendered once at page boot. Each card has a
//! live value slot (`feature-value:<title>`) showing "—" until the metrics
//! aggregator fills it, and a "View Details →" button carrying its destination in `data-link`.

use async_trait::async_trait;
use std::sync::Arc;

use crate::display::{ids, Display, Node};
use crate::navigation::Navigator;
use crate::page::{Controller, PageEvent};

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureCard {
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub link: &'static str,
}

pub const FEATURE_CARDS: [FeatureCard; 6] = [
    FeatureCard {
        title: "PPM Calendar",
        description: "Upcoming deadlines, meetings, and milestones.",
        icon: "📆",
        link: "ppm-calendar.html",
    },
    FeatureCard {
        title: "Birthday Calendar",
        description: "Don't miss any colleague or student birthdays.",
        icon: "🎂",
        link: "birthday-calendar.html",
    },
    FeatureCard {
        title: "Academic Calendar",
        description: "Stay on top of school events, exams, and holidays.",
        icon: "🎓",
        link: "academic.html",
    },
    FeatureCard {
        title: "Total Assets",
        description: "Current total value of recorded assets.",
        icon: "📦",
        link: "total-assets.html",
    },
    FeatureCard {
        title: "Information Hub",
        description: "Latest news, announcements, and industry trends.",
        icon: "ℹ️",
        link: "information.html",
    },
    FeatureCard {
        title: "Knowledge Hub",
        description: "Access learning resources and tutorials.",
        icon: "📚",
        link: "knowledge.html",
    },
];

#[derive(Debug, Clone, PartialEq)]
pub struct QuickLink {
    pub label: &'static str,
    pub href: &'static str,
}

pub const QUICK_LINKS: [QuickLink; 6] = [
    QuickLink {
        label: "Manage Projects",
        href: "projects.html",
    },
    QuickLink {
        label: "View Target List",
        href: "target-list.html",
    },
    QuickLink {
        label: "Report Violations",
        href: "violations.html",
    },
    QuickLink {
        label: "Open Team Chat",
        href: "chat.html",
    },
    QuickLink {
        label: "Your Profile",
        href: "profile.html",
    },
    QuickLink {
        label: "App Settings",
        href: "settings.html",
    },
];

/// Shown in a card's value slot before its first snapshot
pub const VALUE_PLACEHOLDER: &str = "—";

fn card_node(card: &FeatureCard) -> Node {
    Node::new("div")
        .class("feature-card")
        .child(Node::new("div").class("feature-icon").text(card.icon))
        .child(Node::new("h3").class("feature-title").text(card.title))
        .child(
            Node::new("p")
                .class("feature-description")
                .text(card.description),
        )
        .child(
            Node::new("div")
                .id(ids::feature_value(card.title))
                .class("feature-value")
                .text(VALUE_PLACEHOLDER),
        )
        .child(
            Node::new("button")
                .id(ids::feature_link(card.title))
                .class("btn btn-secondary")
                .attr("data-link", card.link)
                .text("View Details →"),
        )
}

/// Render every feature card into the features grid
pub fn render_feature_cards(display: &dyn Display) -> bool {
    let nodes = FEATURE_CARDS.iter().map(card_node).collect();
    display.replace_children(ids::FEATURES_GRID, nodes)
}

/// Render the quick links list
pub fn render_quick_links(display: &dyn Display) -> bool {
    let nodes = QUICK_LINKS
        .iter()
        .map(|link| {
            Node::new("li").child(
                Node::new("a")
                    .attr("href", link.href)
                    .text(format!("→ {}", link.label)),
            )
        })
        .collect();
    display.replace_children(ids::QUICK_LINKS, nodes)
}

/// Follows `data-link` buttons and `href` anchors
pub struct LinkController {
    display: Arc<dyn Display>,
    navigator: Arc<dyn Navigator>,
}

impl LinkController {
    pub fn new(display: Arc<dyn Display>, navigator: Arc<dyn Navigator>) -> Self {
        Self { display, navigator }
    }

    /// Destination of a clickable element, if it has one
    pub fn destination(&self, target: &str) -> Option<String> {
        self.display
            .attribute(target, "data-link")
            .or_else(|| self.display.attribute(target, "href"))
            .filter(|link| !link.is_empty())
    }
}

#[async_trait]
impl Controller for LinkController {
    async fn handle(&self, event: &PageEvent) -> bool {
        let Some(target) = event.clicked() else {
            return false;
        };
        match self.destination(target) {
            Some(link) => {
                self.navigator.navigate(&link);
                true
            }
            None => false,
        }
    }
}

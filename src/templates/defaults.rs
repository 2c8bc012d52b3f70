//! Built-in templates for every content category.

use super::{ContentTemplate, ParamKind, ParamSpec};
use crate::types::ContentCategory;

const GAME_MASTER: &str = "You are the game master of a fantasy text adventure. \
Answer with a single JSON object and nothing else: no prose, no markdown fences.";

pub(super) fn builtin_templates() -> Vec<ContentTemplate> {
    vec![npc(), quest(), monster(), item(), room()]
}

fn npc() -> ContentTemplate {
    ContentTemplate::new(
        ContentCategory::Npc,
        GAME_MASTER,
        "Create a {importance} non-player character found in {location}. \
         They work as a {type}. Return JSON with the fields \"name\", \"race\", \
         \"personality\", \"appearance\", \"dialogue\" (a list of three short lines) \
         and \"secret\".",
    )
    .param(ParamSpec::required("location", ParamKind::Text))
    .param(ParamSpec::optional("type", ParamKind::Text, "commoner"))
    .param(ParamSpec::optional("importance", ParamKind::Text, "minor"))
    .required_fields(["name", "race", "personality"])
}

fn quest() -> ContentTemplate {
    ContentTemplate::new(
        ContentCategory::Quest,
        GAME_MASTER,
        "Design a {difficulty} quest that begins in {location}, offered by {giver}. \
         Return JSON with the fields \"title\", \"description\", \"objectives\" \
         (a list), \"reward\" and \"twist\".",
    )
    .param(ParamSpec::required("location", ParamKind::Text))
    .param(ParamSpec::optional("difficulty", ParamKind::Text, "medium"))
    .param(ParamSpec::optional("giver", ParamKind::Text, "a worried villager"))
    .required_fields(["title", "description", "objectives"])
}

fn monster() -> ContentTemplate {
    ContentTemplate::new(
        ContentCategory::Monster,
        GAME_MASTER,
        "Invent a level {level} monster that lairs in {location}. Return JSON with \
         the fields \"name\", \"description\", \"abilities\" (a list), \"weakness\" \
         and \"health\" (an integer).",
    )
    .param(ParamSpec::required("location", ParamKind::Text))
    .param(ParamSpec::optional("level", ParamKind::Integer, 1))
    .required_fields(["name", "description", "abilities"])
}

fn item() -> ContentTemplate {
    ContentTemplate::new(
        ContentCategory::Item,
        GAME_MASTER,
        "Describe a {rarity} {item_type} an adventurer might find. Return JSON with \
         the fields \"name\", \"description\", \"rarity\", \"value\" (gold pieces, an \
         integer) and \"effect\".",
    )
    .param(ParamSpec::required("item_type", ParamKind::Text))
    .param(ParamSpec::optional("rarity", ParamKind::Text, "common"))
    .required_fields(["name", "description", "rarity"])
}

fn room() -> ContentTemplate {
    ContentTemplate::new(
        ContentCategory::Room,
        GAME_MASTER,
        "Describe a room in {area} with a {theme} atmosphere. Return JSON with the \
         fields \"name\", \"description\", \"exits\" (a list of directions) and \
         \"features\" (a list).",
    )
    .param(ParamSpec::required("area", ParamKind::Text))
    .param(ParamSpec::optional("theme", ParamKind::Text, "forgotten"))
    .required_fields(["name", "description", "exits"])
}

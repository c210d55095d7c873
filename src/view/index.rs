use maud::{Markup, html};

use crate::games;

#[must_use]
pub fn render_index() -> Markup {
    html! {
        (maud::DOCTYPE)
        head {
            meta charset="UTF-8";
            meta name="viewport" content="width=device-width, initial-scale=1.0";
            link rel="stylesheet" type="text/css" href="static/styles.css";
            title { "El Apuntador" }
        }
        body {
            h1 { "El Apuntador" }
            p { "Elige un juego para abrir su marcador." }
            ul class="game-list" {
                @for game in &games::GAMES {
                    li {
                        a href=(format!("/scores?game={}", game.key)) { (game.name) }
                    }
                }
            }
        }
    }
}

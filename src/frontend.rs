use web_sys::window;
use yew::prelude::*;

use crate::composer;

#[derive(Clone, PartialEq)]
struct Phrase {
    de: &'static str,
    en: &'static str,
}

const fn phrase(de: &'static str, en: &'static str) -> Phrase {
    Phrase { de, en }
}

#[derive(Properties, PartialEq)]
struct TextProps {
    text: Phrase,
}

/// Inline text carrying both translations; rendered in German until the
/// language controller takes over.
#[function_component(Text)]
fn text(props: &TextProps) -> Html {
    html! {
        <span data-de={props.text.de} data-en={props.text.en}>
            {props.text.de}
        </span>
    }
}

#[derive(Clone, PartialEq)]
struct Tool {
    name: &'static str,
    summary: Phrase,
}

const TOOLS: [Tool; 3] = [
    Tool {
        name: "Image Converter",
        summary: phrase(
            "Bilder direkt im Browser zwischen Formaten umwandeln.",
            "Convert images between formats right in the browser.",
        ),
    },
    Tool {
        name: "JSON Formatter",
        summary: phrase(
            "JSON prüfen, einrücken und kompakt ausgeben.",
            "Validate, indent and minify JSON.",
        ),
    },
    Tool {
        name: "Color Palette",
        summary: phrase(
            "Harmonische Farbpaletten aus einer Grundfarbe erzeugen.",
            "Generate harmonious palettes from a single base colour.",
        ),
    },
];

#[derive(Properties, PartialEq)]
struct ToolCardProps {
    tool: Tool,
}

#[function_component(ToolCard)]
fn tool_card(props: &ToolCardProps) -> Html {
    html! {
        <article class="card-hover reveal-on-scroll tool-card">
            <h3>{props.tool.name}</h3>
            <p><Text text={props.tool.summary.clone()} /></p>
        </article>
    }
}

#[function_component(NavBar)]
fn nav_bar() -> Html {
    let links = [
        ("#about", phrase("Über mich", "About")),
        ("#tools", phrase("Tools", "Tools")),
        ("#contact", phrase("Kontakt", "Contact")),
    ];

    html! {
        <nav class="floating-nav" aria-label="Primary">
            { for links.into_iter().map(|(href, label)| html! {
                <a class="nav-link" href={href}><Text text={label} /></a>
            }) }
            <div class="language-switch">
                <button class="language-btn" type="button" data-lang="de">{"DE"}</button>
                <button class="language-btn" type="button" data-lang="en">{"EN"}</button>
            </div>
            <button id="themeToggle" class="theme-toggle" type="button" aria-pressed="false">
                <span aria-hidden="true">{"◐"}</span>
            </button>
        </nav>
    }
}

#[function_component(Hero)]
fn hero() -> Html {
    html! {
        <section id="hero" class="hero">
            <div class="hero-content">
                <h1><Text text={phrase("Hallo, ich baue Werkzeuge für das Web.", "Hi, I build tools for the web.")} /></h1>
                <p><Text text={phrase(
                    "Kleine, schnelle Helfer für den Alltag, direkt im Browser.",
                    "Small, fast helpers for everyday work, right in the browser.",
                )} /></p>
                <p class="typewriter-line">
                    <span class="typewriter">
                        <Text text={phrase("Rust, WebAssembly und viel Neugier.", "Rust, WebAssembly and plenty of curiosity.")} />
                    </span>
                </p>
                <div class="hero-actions">
                    <button class="btn-gradient" type="button">
                        <Text text={phrase("Tools erkunden", "Explore tools")} />
                    </button>
                    <button class="btn-gradient" type="button">
                        <Text text={phrase("Kontakt aufnehmen", "Get in touch")} />
                    </button>
                </div>
            </div>
        </section>
    }
}

#[function_component(ContactForm)]
fn contact_form() -> Html {
    html! {
        <section id="contact" class="section-block reveal-on-scroll">
            <h2><Text text={phrase("Kontakt", "Contact")} /></h2>
            <form class="contact-form">
                <input
                    name="name"
                    type="text"
                    placeholder="Ihr Name"
                    data-de-placeholder="Ihr Name"
                    data-en-placeholder="Your name"
                />
                <input
                    name="email"
                    type="email"
                    placeholder="Ihre E-Mail"
                    data-de-placeholder="Ihre E-Mail"
                    data-en-placeholder="Your email"
                />
                <textarea
                    name="message"
                    placeholder="Ihre Nachricht"
                    data-de-placeholder="Ihre Nachricht"
                    data-en-placeholder="Your message"
                />
                <button class="btn-gradient" type="submit" data-de="Senden" data-en="Send">
                    {"Senden"}
                </button>
            </form>
        </section>
    }
}

#[function_component(App)]
fn app() -> Html {
    use_effect_with((), |_| {
        composer::start();
        composer::shutdown
    });

    html! {
        <>
            <NavBar />
            <main id="content">
                <Hero />
                <section id="about" class="section-block reveal-on-scroll">
                    <h2><Text text={phrase("Über mich", "About")} /></h2>
                    <p><Text text={phrase(
                        "Ich entwickle Web-Anwendungen mit Fokus auf Geschwindigkeit und Zugänglichkeit.",
                        "I build web applications with a focus on speed and accessibility.",
                    )} /></p>
                </section>
                <section id="tools" class="section-block">
                    <h2><Text text={phrase("Tools", "Tools")} /></h2>
                    <div class="tool-grid">
                        { for TOOLS.into_iter().map(|tool| html! { <ToolCard tool={tool} /> }) }
                    </div>
                </section>
                <ContactForm />
            </main>
            <footer id="footer" class="site-footer">
                <Text text={phrase("Gebaut mit Rust und WebAssembly.", "Built with Rust and WebAssembly.")} />
            </footer>
        </>
    }
}

pub fn run() {
    yew::Renderer::<App>::with_root(
        window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("app"))
            .expect("missing #app mount point"),
    )
    .render();
}

//! Document Renderer - Certificate and Letter
//!
//! Output is a complete standalone HTML document: styles live in the
//! document itself, there are no scripts, and images are referenced by
//! path. Every piece of record or settings text is escaped.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::artwork::{Artwork, EditionKind};
use crate::clock::Clock;
use crate::edition::describe_edition;
use crate::settings::DocumentSettings;

/// Shown in place of a code that has not been generated yet
pub const CODE_PLACEHOLDER: &str = "____________";

const MONTHS_ES: [&str; 12] = [
    "enero", "febrero", "marzo", "abril", "mayo", "junio",
    "julio", "agosto", "septiembre", "octubre", "noviembre", "diciembre",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Certificate,
    Letter,
}

impl DocumentKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Certificate => "Certificado",
            Self::Letter => "Carta",
        }
    }
}

/// Title for the print surface, e.g. `Certificado - Marea Baja`
pub fn document_title(kind: DocumentKind, artwork: &Artwork) -> String {
    format!("{} - {}", kind.label(), artwork.title())
}

pub fn render(kind: DocumentKind, artwork: &Artwork, settings: &DocumentSettings, clock: &dyn Clock) -> String {
    match kind {
        DocumentKind::Certificate => render_certificate(artwork, settings, clock),
        DocumentKind::Letter => render_letter(artwork, settings, clock),
    }
}

pub fn render_certificate(artwork: &Artwork, settings: &DocumentSettings, clock: &dyn Clock) -> String {
    let artist = escape_html(&settings.artist_name);
    let artist_title = escape_html(&settings.artist_title);

    let mut body = String::new();
    body.push_str(&logo(settings));
    body.push_str("<h1 class=\"doc-title\">CERTIFICADO DE AUTENTICIDAD</h1>\n");
    body.push_str(&format!(
        "<p class=\"attestation\">Yo, <strong>{artist}</strong>, {artist_title}, certifico que la obra \
         descrita a continuación es original y de mi autoría, y que los datos que figuran en este \
         documento son verídicos.</p>\n"
    ));

    if !artwork.image().is_empty() {
        body.push_str(&format!(
            "<div class=\"artwork\"><img src=\"{}\" alt=\"{}\"></div>\n",
            escape_html(artwork.image()),
            escape_html(artwork.title())
        ));
    }

    let rows = [
        ("Título", escape_html(artwork.title())),
        ("Fecha de creación", format_month_year(artwork.certification_date())),
        ("Dimensiones", escape_html(artwork.dimensions())),
        ("Técnica", escape_html(artwork.technique())),
        ("Código de referencia", code_or_placeholder(artwork)),
        ("Edición", escape_html(&describe_edition(artwork))),
    ];
    body.push_str("<table class=\"details\">\n");
    for (label, value) in rows {
        body.push_str(&format!(
            "<tr><th>{label}</th><td>{value}</td></tr>\n"
        ));
    }
    body.push_str("</table>\n");

    body.push_str(&format!(
        "<div class=\"signature-row\">\
         <div class=\"signature-date\">{}</div>\
         <div class=\"signature\"><div class=\"signature-line\"></div>\
         <div class=\"signature-name\">{artist}</div>\
         <div class=\"signature-title\">{artist_title}</div></div>\
         </div>\n",
        format_long_date(clock.today())
    ));

    body.push_str(&contact_footer(settings));

    document(
        &format!("Certificado de Autenticidad - {}", escape_html(artwork.title())),
        CERTIFICATE_STYLE,
        &body,
    )
}

pub fn render_letter(artwork: &Artwork, settings: &DocumentSettings, clock: &dyn Clock) -> String {
    let title = escape_html(artwork.title());
    let edition = escape_html(&describe_edition(artwork));
    let code = code_or_placeholder(artwork);

    let mut body = String::new();
    body.push_str(&logo(settings));
    body.push_str(&format!(
        "<p class=\"place-date\">{}, {}</p>\n",
        escape_html(&settings.city),
        format_long_date(clock.today())
    ));
    body.push_str(&format!("<p class=\"opening\">{}</p>\n", escape_html(&settings.letter_opening)));
    body.push_str(&format!(
        "<p>Por medio de la presente le hago entrega de la obra <strong>«{title}»</strong>, \
         {edition}, identificada con el código de trazabilidad <strong class=\"code\">{code}</strong>. \
         {}</p>\n",
        series_clause(artwork.edition(), settings)
    ));
    body.push_str(&format!("<p>{}</p>\n", escape_html(&settings.letter_closing)));
    body.push_str("<p class=\"sign-off\">Atentamente,</p>\n");
    body.push_str(&format!(
        "<div class=\"signature\"><div class=\"signature-line\"></div>\
         <div class=\"signature-name\">{}</div>\
         <div class=\"signature-title\">{}</div></div>\n",
        escape_html(&settings.artist_name),
        escape_html(&settings.artist_title)
    ));

    document(&format!("Carta - {title}"), LETTER_STYLE, &body)
}

fn series_clause(edition: &EditionKind, settings: &DocumentSettings) -> String {
    match edition {
        EditionKind::Limited { .. } => format!(
            "Esta pieza forma parte de la serie numerada del ciclo «{}».",
            escape_html(&settings.cycle_name)
        ),
        EditionKind::Open => {
            "Esta reproducción pertenece a una edición seriada abierta en impresión giclée.".to_string()
        }
        EditionKind::Unique => {
            "Se trata de una pieza original única, sin reproducciones seriadas.".to_string()
        }
    }
}

fn code_or_placeholder(artwork: &Artwork) -> String {
    match artwork.code() {
        Some(code) => escape_html(code),
        None => CODE_PLACEHOLDER.to_string(),
    }
}

fn logo(settings: &DocumentSettings) -> String {
    if settings.logo.is_empty() {
        return String::new();
    }
    format!(
        "<div class=\"logo\"><img src=\"{}\" alt=\"{}\"></div>\n",
        escape_html(&settings.logo),
        escape_html(&settings.artist_name)
    )
}

fn contact_footer(settings: &DocumentSettings) -> String {
    let items: Vec<String> = [&settings.website, &settings.email, &settings.social_handle]
        .into_iter()
        .filter(|s| !s.is_empty())
        .map(|s| escape_html(s))
        .collect();
    format!("<footer class=\"contact\">{}</footer>\n", items.join(" &middot; "))
}

fn document(title: &str, style: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"es\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>{title}</title>\n\
         <style>{base}{style}</style>\n\
         </head>\n\
         <body>\n\
         <main class=\"page\">\n\
         {body}\
         </main>\n\
         </body>\n\
         </html>\n",
        base = BASE_STYLE,
    )
}

/// `10 de diciembre de 2025`
pub fn format_long_date(date: NaiveDate) -> String {
    format!("{} de {} de {}", date.day(), month_name(date), date.year())
}

/// `diciembre de 2025`
pub fn format_month_year(date: NaiveDate) -> String {
    format!("{} de {}", month_name(date), date.year())
}

fn month_name(date: NaiveDate) -> &'static str {
    MONTHS_ES[date.month0() as usize]
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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

const BASE_STYLE: &str = "\
@page { size: A4; margin: 18mm; }\
* { box-sizing: border-box; }\
body { margin: 0; font-family: Georgia, 'Times New Roman', serif; color: #222; background: #fff; }\
.page { max-width: 180mm; margin: 0 auto; padding: 12mm 0; }\
.logo { text-align: center; margin-bottom: 8mm; }\
.logo img { max-height: 22mm; }\
.signature { text-align: right; margin-left: auto; width: 70mm; }\
.signature-line { border-bottom: 1px solid #222; height: 18mm; margin-bottom: 2mm; }\
.signature-name { font-weight: bold; }\
.signature-title { font-size: 10pt; color: #555; }\
@media print { .page { padding: 0; } }";

const CERTIFICATE_STYLE: &str = "\
.doc-title { text-align: center; letter-spacing: 0.2em; font-size: 20pt; margin: 0 0 6mm; }\
.attestation { text-align: justify; line-height: 1.6; }\
.artwork { text-align: center; margin: 6mm 0; }\
.artwork img { max-width: 100%; max-height: 90mm; }\
.details { width: 100%; border-collapse: collapse; margin: 4mm 0 10mm; }\
.details th { text-align: left; width: 45mm; padding: 2mm; font-weight: normal; color: #555; }\
.details td { padding: 2mm; border-bottom: 1px solid #ddd; }\
.signature-row { display: flex; justify-content: space-between; align-items: flex-end; }\
.signature-date { font-size: 10pt; }\
.contact { margin-top: 12mm; text-align: center; font-size: 9pt; color: #777; }";

const LETTER_STYLE: &str = "\
.place-date { text-align: right; margin-bottom: 10mm; }\
.opening { margin-bottom: 6mm; }\
p { line-height: 1.7; text-align: justify; }\
.code { letter-spacing: 0.05em; }\
.sign-off { margin-top: 10mm; }";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    fn clock() -> FixedClock {
        FixedClock(NaiveDate::from_ymd_opt(2026, 10, 17).unwrap())
    }

    fn artwork(edition: EditionKind) -> Artwork {
        Artwork::new(2, "Marea <Baja>", NaiveDate::from_ymd_opt(2025, 12, 10).unwrap(), edition)
            .with_details("50 x 70 cm", "Giclée", "/images/marea.jpg")
    }

    fn position(haystack: &str, needle: &str) -> usize {
        haystack.find(needle).unwrap_or_else(|| panic!("missing {needle:?}"))
    }

    #[test]
    fn test_long_dates() {
        let d = NaiveDate::from_ymd_opt(2025, 12, 10).unwrap();
        assert_eq!(format_long_date(d), "10 de diciembre de 2025");
        assert_eq!(format_month_year(d), "diciembre de 2025");
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape_html(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn test_certificate_section_order() {
        let mut a = artwork(EditionKind::Limited { index: 3, total: 12 });
        a.attach_code();
        let html = render_certificate(&a, &DocumentSettings::default(), &clock());

        let order = [
            "class=\"logo\"",
            "CERTIFICADO DE AUTENTICIDAD",
            "class=\"attestation\"",
            "class=\"artwork\"",
            "<th>Título</th>",
            "<th>Fecha de creación</th><td>diciembre de 2025</td>",
            "<th>Dimensiones</th>",
            "<th>Técnica</th>",
            "<th>Código de referencia</th><td>MA-2025-2512-03/12</td>",
            "<th>Edición</th><td>Edición Limitada 3/12</td>",
            "17 de octubre de 2026",
            "class=\"signature-name\"",
            "class=\"contact\"",
        ];
        let positions: Vec<usize> = order.iter().map(|n| position(&html, n)).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{positions:?}");
    }

    #[test]
    fn test_certificate_escapes_title() {
        let html = render_certificate(&artwork(EditionKind::Unique), &DocumentSettings::default(), &clock());
        assert!(html.contains("Marea &lt;Baja&gt;"));
        assert!(!html.contains("Marea <Baja>"));
    }

    #[test]
    fn test_missing_code_renders_placeholder() {
        let a = artwork(EditionKind::Unique);
        let html = render_certificate(&a, &DocumentSettings::default(), &clock());
        assert!(html.contains(&format!("<th>Código de referencia</th><td>{CODE_PLACEHOLDER}</td>")));
        let letter = render_letter(&a, &DocumentSettings::default(), &clock());
        assert!(letter.contains(CODE_PLACEHOLDER));
    }

    #[test]
    fn test_letter_series_clause() {
        let settings = DocumentSettings { cycle_name: "Mareas 2025".into(), ..Default::default() };

        let limited = render_letter(&artwork(EditionKind::Limited { index: 1, total: 5 }), &settings, &clock());
        assert!(limited.contains("del ciclo «Mareas 2025»"));

        let open = render_letter(&artwork(EditionKind::Open), &settings, &clock());
        assert!(open.contains("edición seriada abierta"));
        assert!(!open.contains("Mareas 2025"));

        let unique = render_letter(&artwork(EditionKind::Unique), &settings, &clock());
        assert!(unique.contains("pieza original única"));
    }

    #[test]
    fn test_letter_layout() {
        let settings = DocumentSettings {
            city: "Valencia".into(),
            letter_opening: "Querida Lucía:".into(),
            letter_closing: "Un cordial saludo.".into(),
            ..Default::default()
        };
        let mut a = artwork(EditionKind::Open);
        a.attach_code();
        let html = render_letter(&a, &settings, &clock());

        let order = [
            "class=\"logo\"",
            "Valencia, 17 de octubre de 2026",
            "Querida Lucía:",
            "Edición Seriada Abierta (Giclée)",
            "MA-2025-2512-02",
            "Un cordial saludo.",
            "Atentamente,",
            "class=\"signature-name\"",
        ];
        let positions: Vec<usize> = order.iter().map(|n| position(&html, n)).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{positions:?}");
    }

    #[test]
    fn test_documents_are_standalone() {
        for kind in [DocumentKind::Certificate, DocumentKind::Letter] {
            let html = render(kind, &artwork(EditionKind::Unique), &DocumentSettings::default(), &clock());
            assert!(html.starts_with("<!DOCTYPE html>"));
            assert!(html.trim_end().ends_with("</html>"));
            assert!(!html.contains("<script"));
            assert!(!html.contains("<link"));
        }
    }

    #[test]
    fn test_settings_fields_are_escaped() {
        let hostile = |field: &str| format!("<script>{field}</script>\" onload='x'");
        let settings = DocumentSettings {
            artist_name: hostile("artist_name"),
            artist_title: hostile("artist_title"),
            cycle_name: hostile("cycle_name"),
            city: hostile("city"),
            letter_opening: hostile("letter_opening"),
            letter_closing: hostile("letter_closing"),
            website: hostile("website"),
            email: hostile("email"),
            social_handle: hostile("social_handle"),
            logo: hostile("logo"),
        };
        let a = artwork(EditionKind::Limited { index: 1, total: 5 });

        let certificate = render_certificate(&a, &settings, &clock());
        let letter = render_letter(&a, &settings, &clock());

        let certificate_fields =
            ["artist_name", "artist_title", "website", "email", "social_handle", "logo"];
        let letter_fields = [
            "artist_name",
            "artist_title",
            "cycle_name",
            "city",
            "letter_opening",
            "letter_closing",
            "logo",
        ];
        for (html, fields) in [(&certificate, &certificate_fields[..]), (&letter, &letter_fields[..])] {
            assert!(!html.contains("<script"));
            assert!(!html.contains("\" onload"));
            for field in fields {
                let escaped = format!("&lt;script&gt;{field}&lt;/script&gt;&quot; onload=&#39;x&#39;");
                assert!(html.contains(&escaped), "{field} not escaped");
            }
        }
    }

    #[test]
    fn test_contact_footer_skips_empty_fields() {
        let settings = DocumentSettings { email: String::new(), ..Default::default() };
        let footer = contact_footer(&settings);
        assert_eq!(footer.matches("&middot;").count(), 1);
    }
}

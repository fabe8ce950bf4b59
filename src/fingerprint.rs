use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::{Arc, LazyLock};

static SHARED_BUILTIN: LazyLock<Result<Arc<SignatureTable>, regex::Error>> =
    LazyLock::new(|| SignatureTable::builtin().map(Arc::new));

/// Technology categories, in the order they are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Frontend,
    Backend,
    Database,
    Hosting,
    Analytics,
    Cms,
    Payment,
    Other,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Frontend,
        Category::Backend,
        Category::Database,
        Category::Hosting,
        Category::Analytics,
        Category::Cms,
        Category::Payment,
        Category::Other,
    ];

    /// Human readable label used by the formatters
    pub fn label(&self) -> &'static str {
        match self {
            Category::Frontend => "Frontend",
            Category::Backend => "Backend",
            Category::Database => "Database",
            Category::Hosting => "Hosting & CDN",
            Category::Analytics => "Analytics",
            Category::Cms => "CMS & E-commerce",
            Category::Payment => "Payment & Auth",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A named technology and the patterns that reveal it
#[derive(Debug, Clone)]
pub struct TechSignature {
    pub name: String,
    pub category: Category,
    patterns: Vec<Regex>,
}

impl TechSignature {
    /// Compiles the patterns case-insensitively
    pub fn new(
        name: impl Into<String>,
        category: Category,
        patterns: &[&str],
    ) -> Result<Self, regex::Error> {
        let patterns = patterns
            .iter()
            .map(|p| RegexBuilder::new(p).case_insensitive(true).build())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name: name.into(),
            category,
            patterns,
        })
    }

    /// True as soon as any pattern matches any source
    pub fn matches(&self, sources: &[String]) -> bool {
        self.patterns
            .iter()
            .any(|pattern| sources.iter().any(|source| pattern.is_match(source)))
    }
}

/// Outcome of running the signature table over one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TechReport {
    pub technologies: BTreeSet<String>,
    pub by_category: BTreeMap<Category, BTreeSet<String>>,
}

/// Immutable set of technology signatures.
///
/// Build it once at startup and share it behind an `Arc`; detection only
/// needs a shared reference.
#[derive(Debug, Clone)]
pub struct SignatureTable {
    signatures: Vec<TechSignature>,
}

impl SignatureTable {
    pub fn new(signatures: Vec<TechSignature>) -> Self {
        Self { signatures }
    }

    /// The built-in signature set
    pub fn builtin() -> Result<Self, regex::Error> {
        let signatures = BUILTIN_SIGNATURES
            .iter()
            .map(|(name, category, patterns)| TechSignature::new(*name, *category, patterns))
            .collect::<Result<Vec<_>, _>>()?;
        ::log::debug!("Loaded {} technology signatures", signatures.len());
        Ok(Self::new(signatures))
    }

    /// The built-in set, compiled on first use and shared by every caller in
    /// the process
    pub fn shared() -> Result<Arc<Self>, regex::Error> {
        SHARED_BUILTIN.clone()
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    pub fn signatures(&self) -> &[TechSignature] {
        &self.signatures
    }

    /// Detects technologies from the page HTML, its script/style/meta
    /// attribute strings and the response headers
    pub fn detect<'a, I>(&self, html: &str, assets: &[String], headers: I) -> TechReport
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut sources = Vec::with_capacity(assets.len() + 2);
        sources.push(html.to_lowercase());
        sources.extend(assets.iter().map(|s| s.to_lowercase()));
        let header_source = headers
            .into_iter()
            .map(|(k, v)| format!("{}:{}", k, v))
            .collect::<Vec<_>>()
            .join(" ");
        sources.push(header_source.to_lowercase());

        let mut report = TechReport::default();
        for signature in &self.signatures {
            if signature.matches(&sources) {
                report.technologies.insert(signature.name.clone());
                report
                    .by_category
                    .entry(signature.category)
                    .or_default()
                    .insert(signature.name.clone());
            }
        }

        ::log::trace!("Detected technologies: {:?}", report.technologies);
        report
    }
}

use Category::*;

#[rustfmt::skip]
const BUILTIN_SIGNATURES: &[(&str, Category, &[&str])] = &[
    ("React", Frontend, &[r#"id=['"]root['"]"#, r"react-dom", r"react"]),
    ("Next.js", Frontend, &[r#"id=['"]__next['"]"#, r"_next/static"]),
    ("Vue.js", Frontend, &[r"vue(\.runtime)?(\.min)?\.js", r"_nuxt_"]),
    ("Angular", Frontend, &[r"ng-version"]),
    ("Svelte", Frontend, &[r"svelte"]),
    ("jQuery", Frontend, &[r"jquery.*\.js"]),
    ("Bootstrap", Frontend, &[r"bootstrap.*\.css", r"bootstrap.*\.js"]),
    ("Tailwind CSS", Frontend, &[r"tailwind.*\.css"]),
    ("Bulma", Frontend, &[r"bulma\.css"]),
    ("Foundation", Frontend, &[r"foundation\.css"]),
    ("Vuex", Frontend, &[r"vuex"]),
    ("Redux", Frontend, &[r"redux"]),
    ("Gatsby", Frontend, &[r#"id=['"]___gatsby['"]"#]),
    ("Nuxt.js", Frontend, &[r"_nuxt_", r"/_nuxt/"]),
    ("Vuetify", Frontend, &[r"vuetify(\.min)?\.js"]),
    ("Preact", Frontend, &[r"preact"]),
    ("Lit", Frontend, &[r"lit-html"]),
    ("Dojo", Frontend, &[r"dojo\.js"]),

    ("Express.js", Backend, &[r"x-powered-by:\s*express"]),
    ("NestJS", Backend, &[r"nestjs"]),
    ("Django", Backend, &[r"csrftoken", r"csrfmiddlewaretoken"]),
    ("Flask", Backend, &[r"flask"]),
    ("Rails", Backend, &[r"_rails_session", r"x-runtime:"]),
    ("Laravel", Backend, &[r"laravel_session"]),
    ("ASP.NET", Backend, &[r"asp\.net", r"aspnet", r"__viewstate"]),
    ("Spring Boot", Backend, &[r"jsessionid"]),
    ("Node.js", Backend, &[r"x-powered-by:\s*node"]),
    ("PHP", Backend, &[r"x-powered-by:\s*php", r"phpsessid"]),
    ("Python", Backend, &[r"server:\s*python", r"server:\s*gunicorn", r"server:\s*uvicorn"]),
    ("Java", Backend, &[r"server:\s*java"]),
    ("Kotlin", Backend, &[r"kotlin"]),
    ("Go", Backend, &[r"go version go\d", r"x-powered-by:\s*go\b"]),
    ("Ruby", Backend, &[r"ruby version", r"x-powered-by:\s*phusion passenger"]),
    ("C#", Backend, &[r"c# version", r"server:\s*kestrel"]),
    ("Rust", Backend, &[r"rustc version", r"server:\s*(actix|rocket)"]),
    ("Scala", Backend, &[r"scala version", r"server:\s*akka-http"]),

    ("MongoDB", Database, &[r"objectid\(", r"mongodb"]),
    ("PostgreSQL", Database, &[r"pg::", r"postgres"]),
    ("MySQL", Database, &[r"mysql"]),
    ("Firebase", Database, &[r"firebaseio\.com", r"firestore"]),
    ("Supabase", Database, &[r"supabase\.co"]),
    ("Redis", Database, &[r"redis"]),
    ("Elasticsearch", Database, &[r"elasticsearch"]),
    ("SQLite", Database, &[r"sqlite"]),
    ("Microsoft SQL Server", Database, &[r"sql server"]),
    ("Cassandra", Database, &[r"cassandra"]),
    ("Couchbase", Database, &[r"couchbase"]),

    ("Nginx", Hosting, &[r"server:\s*nginx"]),
    ("Apache", Hosting, &[r"server:\s*apache"]),
    ("LiteSpeed", Hosting, &[r"server:\s*litespeed"]),
    ("Caddy", Hosting, &[r"server:\s*caddy"]),
    ("IIS", Hosting, &[r"server:\s*microsoft-iis"]),
    ("Tomcat", Hosting, &[r"apache-tomcat"]),
    ("Jetty", Hosting, &[r"server:\s*jetty"]),
    ("Vercel", Hosting, &[r"x-vercel-id", r"server:\s*vercel"]),
    ("Netlify", Hosting, &[r"netlify"]),
    ("Cloudflare", Hosting, &[r"cf-ray", r"cf-cache-status", r"server:\s*cloudflare"]),
    ("Akamai", Hosting, &[r"akamai"]),
    ("AWS CloudFront", Hosting, &[r"x-amz-cf-id", r"cloudfront"]),
    ("Firebase Hosting", Hosting, &[r"firebaseapp\.com", r"web\.app/"]),
    ("Heroku", Hosting, &[r"heroku", r"via:\s*1\.1 vegur"]),
    ("Google Cloud Platform", Hosting, &[r"x-goog-gfe", r"x-cloud-trace-context"]),
    ("Azure", Hosting, &[r"azurewebsites\.net", r"x-azure-ref"]),
    ("AWS S3", Hosting, &[r"amazonaws\.com", r"x-amz-request-id"]),
    ("DigitalOcean Spaces", Hosting, &[r"digitaloceanspaces\.com"]),

    ("Google Analytics", Analytics, &[r"gtag\.js", r"google-analytics\.com", r"\bga\.js"]),
    ("Google Tag Manager", Analytics, &[r"googletagmanager\.com"]),
    ("Hotjar", Analytics, &[r"hotjar"]),
    ("Mixpanel", Analytics, &[r"mixpanel"]),
    ("Facebook Pixel", Analytics, &[r"fbq\(", r"connect\.facebook\.net"]),
    ("Amplitude", Analytics, &[r"amplitude(\.min)?\.js", r"cdn\.amplitude\.com"]),
    ("Matomo", Analytics, &[r"matomo\.js", r"piwik\.js"]),
    ("Segment", Analytics, &[r"segment\.io", r"cdn\.segment\.com"]),
    ("Plausible Analytics", Analytics, &[r"plausible\.io/js/"]),

    ("WordPress", Cms, &[r"wp-content", r"wp-includes", r"generator:\s*wordpress"]),
    ("Drupal", Cms, &[r"drupal-settings-json", r"generator:\s*drupal"]),
    ("Shopify", Cms, &[r"cdn\.shopify\.com"]),
    ("Magento", Cms, &[r"mage/cookies\.js"]),
    ("Wix", Cms, &[r"wixstatic\.com"]),
    ("Joomla", Cms, &[r"joomla"]),
    ("Squarespace", Cms, &[r"squarespace\.com"]),
    ("WooCommerce", Cms, &[r"woocommerce"]),
    ("Contentful", Cms, &[r"cdn\.contentful\.com", r"ctfassets\.net"]),
    ("Strapi", Cms, &[r"strapi"]),
    ("Headless CMS", Cms, &[r#"graphql[^\s"'<>]*cms"#, r#"api[^\s"'<>]*/cms\b"#]),
    ("Ghost", Cms, &[r"ghost-cdn\.com", r"generator:\s*ghost"]),

    ("Stripe", Payment, &[r"js\.stripe\.com"]),
    ("Razorpay", Payment, &[r"checkout\.razorpay\.com"]),
    ("PayPal", Payment, &[r"paypalobjects\.com", r"paypal\.com/sdk"]),
    ("Auth0", Payment, &[r"auth0\.com"]),
    ("Firebase Auth", Payment, &[r"identitytoolkit\.googleapis\.com"]),
    ("Okta", Payment, &[r"okta\.com"]),
    ("Paddle", Payment, &[r"paddle\.js", r"cdn\.paddle\.com"]),
    ("Square", Payment, &[r"squarecdn\.com"]),
    ("Adyen", Payment, &[r"adyen\.com"]),

    ("GraphQL", Other, &[r"graphql"]),
    ("Webpack", Other, &[r"webpack"]),
    ("Babel", Other, &[r"babel"]),
    ("REST API", Other, &[r"/api/v\d+", r#"["']/api/"#]),
    ("gRPC", Other, &[r"grpc-web"]),
    ("WebAssembly", Other, &[r"\.wasm\b"]),
    ("Storybook", Other, &[r"storybook"]),
    ("WebSockets", Other, &[r"new websocket\(", r"wss://"]),
    ("Docker", Other, &[r"\bdocker\b"]),
    ("Kubernetes", Other, &[r"kubernetes"]),
    ("Cypress", Other, &[r"\bcypress\b"]),
    ("Selenium", Other, &[r"\bselenium\b"]),
    ("Service Workers", Other, &[r"serviceworker\.register", r"service-worker\.js"]),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> SignatureTable {
        SignatureTable::builtin().expect("builtin signatures compile")
    }

    fn no_headers() -> Vec<(String, String)> {
        Vec::new()
    }

    fn detect(html: &str, assets: &[&str], headers: &[(&str, &str)]) -> TechReport {
        let assets = assets.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        let headers = headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<Vec<_>>();
        table().detect(html, &assets, headers.iter().map(|(k, v)| (k, v)))
    }

    #[test]
    fn test_builtin_table_compiles() {
        let table = table();
        assert!(table.len() > 50);
        let names: BTreeSet<_> = table.signatures().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names.len(), table.len(), "signature names must be unique");
    }

    #[test]
    fn test_builtin_table_covers_language_and_tooling_signatures() {
        let table = table();
        let expected = [
            ("Go", Category::Backend),
            ("Ruby", Category::Backend),
            ("C#", Category::Backend),
            ("Rust", Category::Backend),
            ("Scala", Category::Backend),
            ("Headless CMS", Category::Cms),
            ("Docker", Category::Other),
            ("Kubernetes", Category::Other),
            ("Cypress", Category::Other),
            ("Selenium", Category::Other),
        ];
        for (name, category) in expected {
            let signature = table
                .signatures()
                .iter()
                .find(|s| s.name == name)
                .unwrap_or_else(|| panic!("{} missing from the built-in table", name));
            assert_eq!(signature.category, category, "{}", name);
        }
    }

    #[test]
    fn test_backend_language_headers() {
        let report = detect("<html></html>", &[], &[("server", "Kestrel"), ("x-powered-by", "Go")]);
        let backend = &report.by_category[&Category::Backend];
        assert!(backend.contains("C#"));
        assert!(backend.contains("Go"));
        assert!(!backend.contains("Rust"));
    }

    #[test]
    fn test_tooling_and_headless_cms() {
        let html = r#"<script src="/assets/cypress-runner.js"></script>
                      <script>fetch("https://example.com/graphql/cms?query=1")</script>"#;
        let report = detect(html, &[], &[]);
        assert!(report.technologies.contains("Cypress"));
        assert!(report.technologies.contains("Headless CMS"));
        assert!(!report.technologies.contains("Selenium"));
    }

    #[test]
    fn test_shared_table_compiled_once() {
        let first = SignatureTable::shared().unwrap();
        let second = SignatureTable::shared().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), table().len());
    }

    #[test]
    fn test_react_root_and_react_dom() {
        let html = r#"<html><body><div id="root"></div></body></html>"#;
        let report = detect(html, &["/static/js/react-dom.production.min.js"], &[]);
        let frontend = report.by_category.get(&Category::Frontend).unwrap();
        assert!(frontend.contains("React"));
        assert!(report.technologies.contains("React"));
    }

    #[test]
    fn test_header_signatures() {
        let report = detect(
            "<html></html>",
            &[],
            &[("server", "nginx/1.25"), ("x-powered-by", "Express")],
        );
        assert!(report.by_category[&Category::Hosting].contains("Nginx"));
        assert!(report.by_category[&Category::Backend].contains("Express.js"));
    }

    #[test]
    fn test_case_insensitive_matching() {
        let report = detect("<script src=\"HTTPS://JS.STRIPE.COM/v3\"></script>", &[], &[]);
        assert!(report.technologies.contains("Stripe"));
        assert_eq!(report.by_category.len(), 1);
    }

    #[test]
    fn test_unknown_page_detects_nothing() {
        let html = "<html><head><title>Plain</title></head><body><p>Hello</p></body></html>";
        let table = table();
        let report = table.detect(html, &[], no_headers().iter().map(|(k, v)| (k, v)));
        assert!(report.technologies.is_empty());
        assert!(report.by_category.is_empty());
    }

    #[test]
    fn test_custom_table() {
        let sig = TechSignature::new("Acme", Category::Other, &[r"acme-widget"]).unwrap();
        let table = SignatureTable::new(vec![sig]);
        let report = table.detect("<div class=\"ACME-WIDGET\"></div>", &[], no_headers().iter().map(|(k, v)| (k, v)));
        assert_eq!(report.technologies.into_iter().collect::<Vec<_>>(), vec!["Acme"]);
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        assert!(TechSignature::new("Broken", Category::Other, &[r"("]).is_err());
    }
}

use clap::Parser;
use enterprise_userlist_app::{generate, Args, ConfigError, Error};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::http::Method;
use wiremock::matchers::header;
use wiremock::Match;
use wiremock::Request;
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "test-token";

const USERS_TEMPLATE: &str = "{{#each users}}{{number}} {{login}} {{email}} {{isOwnDomain}}:\
{{#each organizations}}{{login}}[{{#each repositories}}{{name}}{{#unless last}} {{/unless}}{{/each}}]{{/each}}\n{{/each}}\
{{#each warnings}}! {{message}}\n{{/each}}";

/// Matches a GraphQL POST by operation name and a subset of its variables.
pub struct GraphQlMatcher {
    operation: &'static str,
    variables: Value,
}

impl Match for GraphQlMatcher {
    fn matches(&self, request: &Request) -> bool {
        if request.method != Method::Post || request.url.path() != "/graphql" {
            return false;
        }
        let body: Value = match serde_json::from_slice(&request.body) {
            Ok(body) => body,
            Err(_) => return false,
        };
        let query = body["query"].as_str().unwrap_or_default();
        if !query.contains(&format!("query {}(", self.operation)) {
            return false;
        }
        match &self.variables {
            Value::Object(expected) => expected
                .iter()
                .all(|(name, value)| &body["variables"][name.as_str()] == value),
            _ => true,
        }
    }
}

async fn mount(server: &MockServer, operation: &'static str, variables: Value, response: ResponseTemplate) {
    Mock::given(GraphQlMatcher { operation, variables })
        .and(header("Authorization", format!("bearer {}", TOKEN).as_str()))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

fn page_info(end_cursor: Option<&str>) -> Value {
    json!({ "hasNextPage": end_cursor.is_some(), "endCursor": end_cursor })
}

fn account(login: &str, email: &str, contributions: u32) -> Value {
    json!({
        "login": login,
        "name": format!("{} name", login),
        "email": email,
        "contributionsCollection": { "contributionCalendar": { "totalContributions": contributions } },
    })
}

fn organizations_response(logins: &[&str]) -> ResponseTemplate {
    let nodes: Vec<Value> = logins
        .iter()
        .map(|login| json!({ "login": login, "name": login.to_uppercase() }))
        .collect();
    ResponseTemplate::new(200).set_body_json(json!({
        "data": { "enterprise": {
            "slug": "acme",
            "name": "Acme",
            "organizations": { "pageInfo": page_info(None), "nodes": nodes },
        } }
    }))
}

fn repositories_response(repositories: Vec<(&str, Vec<Value>)>) -> ResponseTemplate {
    let nodes: Vec<Value> = repositories
        .into_iter()
        .map(|(name, collaborators)| {
            json!({
                "name": name,
                "collaborators": { "pageInfo": page_info(None), "nodes": collaborators },
            })
        })
        .collect();
    ResponseTemplate::new(200).set_body_json(json!({
        "data": { "organization": { "repositories": { "pageInfo": page_info(None), "nodes": nodes } } }
    }))
}

fn members_response(identities: Vec<Value>, end_cursor: Option<&str>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "data": { "enterprise": {
            "slug": "acme",
            "name": "Acme",
            "ownerInfo": { "samlIdentityProvider": { "externalIdentities": {
                "pageInfo": page_info(end_cursor),
                "nodes": identities,
            } } },
        } }
    }))
}

fn identity(name_id: &str, login: Option<&str>, organizations: &[&str]) -> Value {
    let user = login.map(|login| {
        let mut user = account(login, "", 0);
        user["organizations"] = json!({
            "pageInfo": page_info(None),
            "nodes": organizations.iter().map(|o| json!({ "login": o, "name": o.to_uppercase() })).collect::<Vec<_>>(),
        });
        user
    });
    json!({ "samlIdentity": { "nameId": name_id }, "user": user })
}

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Workspace {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn template(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

fn args(server: &MockServer, action: &str, templates: &[&Path], outputs: &[&Path], extra: &[&str]) -> Args {
    let join = |paths: &[&Path]| {
        paths
            .iter()
            .map(|path| path.display().to_string())
            .collect::<Vec<_>>()
            .join(",")
    };
    let mut argv = vec![
        "userlist".to_string(),
        "--action".to_string(),
        action.to_string(),
        "--enterprise".to_string(),
        "acme".to_string(),
        "--github-token".to_string(),
        TOKEN.to_string(),
        "--api-url".to_string(),
        server.uri(),
        "--template-files".to_string(),
        join(templates),
        "--output-files".to_string(),
        join(outputs),
    ];
    argv.extend(extra.iter().map(|arg| arg.to_string()));
    Args::try_parse_from(argv).unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn collaborators_of_all_organizations() {
    let server = MockServer::start().await;
    mount(
        &server,
        "EnterpriseOrganizations",
        json!({ "slug": "acme", "after": null }),
        organizations_response(&["west", "east"]),
    )
    .await;
    mount(
        &server,
        "OrganizationRepositories",
        json!({ "login": "west", "after": null }),
        repositories_response(vec![
            (
                "api",
                vec![account("carol", "carol@partner.io", 7), account("dave", "dave@acme.io", 3)],
            ),
            ("web", vec![account("carol", "carol@partner.io", 7)]),
        ]),
    )
    .await;
    mount(
        &server,
        "OrganizationRepositories",
        json!({ "login": "east", "after": null }),
        repositories_response(vec![("app", vec![account("dave", "dave@acme.io", 3)])]),
    )
    .await;
    let workspace = Workspace::new();
    let template = workspace.template("users.hbs", USERS_TEMPLATE);
    let sample = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates/collaborators.md.hbs");
    let output = workspace.path("users.txt");
    let markdown = workspace.path("collaborators.md");
    let json_file = workspace.path("users.json");
    let json_arg = json_file.display().to_string();

    let report = generate(args(
        &server,
        "collaborators",
        &[&template, &sample],
        &[&output, &markdown],
        &["--own-domains", "acme.io", "--max-organization-requests", "2", "--json-file", &json_arg],
    ))
    .await
    .unwrap();

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "1 carol carol@partner.io false:west[api web]\n2 dave dave@acme.io true:west[api]east[app]\n"
    );
    let markdown = fs::read_to_string(&markdown).unwrap();
    assert!(markdown.starts_with("# Outside collaborators of Acme"));
    assert!(markdown.contains("[carol](https://github.com/carol)"));
    assert!(!markdown.contains("## Warnings"));

    let dump: Value = serde_json::from_str(&fs::read_to_string(&json_file).unwrap()).unwrap();
    assert_eq!(dump["enterprise"], json!({ "slug": "acme", "name": "Acme" }));
    assert_eq!(dump["users"][1]["login"], "dave");
    assert_eq!(dump["users"][1]["contributions"], 3);
    assert_eq!(dump["users"][1]["last"], true);
    assert_eq!(report.user_list().unwrap().users().len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn failing_organization_becomes_warning() {
    let server = MockServer::start().await;
    mount(
        &server,
        "EnterpriseOrganizations",
        json!({ "slug": "acme" }),
        organizations_response(&["a", "b", "c"]),
    )
    .await;
    mount(
        &server,
        "OrganizationRepositories",
        json!({ "login": "a" }),
        repositories_response(vec![("one", vec![account("carol", "carol@partner.io", 1)])]),
    )
    .await;
    mount(
        &server,
        "OrganizationRepositories",
        json!({ "login": "b" }),
        ResponseTemplate::new(500).set_body_string("boom"),
    )
    .await;
    mount(
        &server,
        "OrganizationRepositories",
        json!({ "login": "c" }),
        repositories_response(vec![("three", vec![account("erin", "erin@partner.io", 1)])]),
    )
    .await;
    let workspace = Workspace::new();
    let template = workspace.template("users.hbs", USERS_TEMPLATE);
    let output = workspace.path("users.txt");

    generate(args(&server, "collaborators", &[&template], &[&output], &[]))
        .await
        .unwrap();

    let rendered = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines[0], "1 carol carol@partner.io false:a[one]");
    assert_eq!(lines[1], "2 erin erin@partner.io false:c[three]");
    assert!(lines[2].starts_with("! Unable to load repositories of organization b:"));
    assert_eq!(lines.len(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn members_across_pages() {
    let server = MockServer::start().await;
    mount(
        &server,
        "EnterpriseMembers",
        json!({ "slug": "acme", "after": null, "first": 2 }),
        members_response(
            vec![
                identity("alice@acme.io", Some("alice"), &["west"]),
                identity("ghost@acme.io", None, &[]),
            ],
            Some("cursor-1"),
        ),
    )
    .await;
    mount(
        &server,
        "EnterpriseMembers",
        json!({ "slug": "acme", "after": "cursor-1", "first": 2 }),
        members_response(vec![identity("bob@partner.io", Some("bob"), &["west", "east"])], None),
    )
    .await;
    let workspace = Workspace::new();
    let template = workspace.template("users.hbs", USERS_TEMPLATE);
    let output = workspace.path("users.txt");

    generate(args(
        &server,
        "members",
        &[&template],
        &[&output],
        &["--page-size", "2", "--own-domains", "acme.io"],
    ))
    .await
    .unwrap();

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "1 alice alice@acme.io true:west[]\n\
         2 bob bob@partner.io false:west[]east[]\n\
         ! SAML identity ghost@acme.io is not linked to a GitHub account\n"
    );
}

#[tokio::test]
async fn mismatched_files_fail_before_any_request() {
    let server = MockServer::start().await;
    let workspace = Workspace::new();
    let template = workspace.template("users.hbs", USERS_TEMPLATE);

    let err = generate(args(
        &server,
        "members",
        &[&template, &template],
        &[&workspace.path("users.txt")],
        &[],
    ))
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        Error::Config(ConfigError::Mismatch {
            templates: 2,
            outputs: 1
        })
    ));
    assert_eq!(server.received_requests().await.unwrap_or_default().len(), 0);
}

#[tokio::test]
async fn unknown_enterprise_is_fatal() {
    let server = MockServer::start().await;
    mount(
        &server,
        "EnterpriseOrganizations",
        json!({ "slug": "acme" }),
        ResponseTemplate::new(200).set_body_json(json!({
            "data": { "enterprise": null },
            "errors": [ { "message": "Could not resolve to an Enterprise with the slug 'acme'." } ]
        })),
    )
    .await;
    let workspace = Workspace::new();
    let template = workspace.template("users.hbs", USERS_TEMPLATE);
    let output = workspace.path("users.txt");

    let err = generate(args(&server, "collaborators", &[&template], &[&output], &[]))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Api(_)));
    assert!(err.to_string().contains("Could not resolve to an Enterprise"));
    assert!(!output.exists());
}

#[tokio::test]
async fn broken_template_does_not_stop_the_others() {
    let server = MockServer::start().await;
    mount(
        &server,
        "EnterpriseOrganizations",
        json!({ "slug": "acme" }),
        organizations_response(&["west"]),
    )
    .await;
    mount(
        &server,
        "OrganizationRepositories",
        json!({ "login": "west" }),
        repositories_response(vec![("api", vec![account("carol", "carol@partner.io", 1)])]),
    )
    .await;
    let workspace = Workspace::new();
    let broken = workspace.template("broken.hbs", "{{#each users}}");
    let missing = workspace.path("missing.hbs");
    let template = workspace.template("users.hbs", USERS_TEMPLATE);
    let output = workspace.path("users.txt");

    let err = generate(args(
        &server,
        "collaborators",
        &[&broken, &missing, &template],
        &[&workspace.path("broken.txt"), &workspace.path("missing.txt"), &output],
        &[],
    ))
    .await
    .unwrap_err();

    assert!(matches!(err, Error::RenderFailed { failed: 2, total: 3 }));
    assert_eq!(fs::read_to_string(&output).unwrap(), "1 carol carol@partner.io false:west[api]\n");
}

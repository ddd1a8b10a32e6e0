//! Shared test infrastructure for integration tests.

use std::path::Path;
use std::process::{Command, Output};

/// Mock metadata service serving canned XML for one tool.
pub struct MetadataServer {
    pub server: mockito::ServerGuard,
    mocks: Vec<mockito::Mock>,
}

impl MetadataServer {
    pub fn start() -> Self {
        Self {
            server: mockito::Server::new(),
            mocks: Vec::new(),
        }
    }

    /// Base URL with the trailing slash the CLI expects.
    pub fn base_url(&self) -> String {
        format!("{}/", self.server.url())
    }

    /// Serve `body` at `path`, expecting exactly one request.
    pub fn serve(&mut self, path: &str, body: &str) {
        let mock = self
            .server
            .mock("GET", path)
            .with_status(200)
            .with_header("content-type", "application/xml")
            .with_body(body)
            .expect(1)
            .create();
        self.mocks.push(mock);
    }

    /// Serve a tool description, its parameter list, and each parameter's details.
    pub fn serve_tool(&mut self, tool: &str, description: &str, parameters: &[(&str, &str)]) {
        self.serve(
            &format!("/{tool}"),
            &format!("<?xml version=\"1.0\"?>\n<description>{description}</description>"),
        );
        let ids: String = parameters
            .iter()
            .map(|(name, _)| format!("<id>{name}</id>"))
            .collect();
        self.serve(
            &format!("/{tool}/parameters"),
            &format!("<?xml version=\"1.0\"?>\n<parameters>{ids}</parameters>"),
        );
        for (name, details) in parameters {
            self.serve(&format!("/{tool}/parameterdetails/{name}"), details);
        }
    }

    pub fn assert_all_requested(&self) {
        for mock in &self.mocks {
            mock.assert();
        }
    }
}

/// Run the built `cwlgen` binary from `cwd`.
pub fn run_cwlgen(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cwlgen"))
        .args(args)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .output()
        .expect("spawn cwlgen")
}

pub fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent directory");
    }
    std::fs::write(path, contents.as_bytes()).expect("write file");
}

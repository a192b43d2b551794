use std::sync::Arc;

use pretty_assertions::assert_eq;

use super::*;
use crate::generator::CodeGenerator;

#[derive(Debug)]
struct Named(&'static str);

impl CodeGenRootCmd for Named {
    fn description(&self) -> String {
        self.0.to_string()
    }

    fn compile(&self, _gen: &mut CodeGenerator<'_>) {}
}

fn unit(subdir: &str, file_name: &str) -> WriterData {
    WriterData {
        kind: UnitKind::from_file_name(file_name),
        subdir: subdir.to_string(),
        file_name: file_name.to_string(),
        payload: Payload::Contents {
            text: format!("// {file_name}\n"),
            comments: Vec::new(),
        },
        includes: Vec::new(),
        lib_includes: Vec::new(),
        forward_declarations: Vec::new(),
    }
}

#[test]
fn kinds_follow_extension() {
    assert_eq!(UnitKind::from_file_name("a.h"), UnitKind::Header);
    assert_eq!(UnitKind::from_file_name("a.cpp"), UnitKind::Source);
    assert_eq!(UnitKind::from_file_name("lib_headers.txt"), UnitKind::Text);
    assert_eq!(UnitKind::from_file_name("Makefile"), UnitKind::Text);
}

#[test]
fn path_omits_empty_subdir() {
    assert_eq!(unit("", "main.cpp").path(), "main.cpp");
    assert_eq!(unit("o_7", "f.h").path(), "o_7/f.h");
}

#[test]
fn content_hash_matches_between_modes() {
    let contents = unit("", "main.cpp");
    let text = contents.text().unwrap_or_default().to_string();
    let hashed = WriterData {
        payload: Payload::Hash(stable_hash(text.as_bytes())),
        ..contents.clone()
    };
    assert_eq!(contents.content_hash(), hashed.content_hash());
}

#[test]
fn drain_is_sorted_by_path() {
    let sink = OutputSink::new();
    let first: Arc<dyn CodeGenRootCmd> = Arc::new(Named("first"));
    let second: Arc<dyn CodeGenRootCmd> = Arc::new(Named("second"));
    sink.extend(&second, vec![unit("o_9", "z.h"), unit("", "main.cpp")]);
    sink.extend(&first, vec![unit("o_1", "a.h")]);
    assert_eq!(sink.len(), 3);

    let paths: Vec<_> = sink.drain_sorted().iter().map(WriterData::path).collect();
    assert_eq!(paths, vec!["main.cpp", "o_1/a.h", "o_9/z.h"]);
    assert!(sink.is_empty());
}

#[test]
fn commands_for_paths_are_deduplicated() {
    let sink = OutputSink::new();
    let header: Arc<dyn CodeGenRootCmd> = Arc::new(Named("vars"));
    let main: Arc<dyn CodeGenRootCmd> = Arc::new(Named("main"));
    sink.extend(&header, vec![unit("globals", "vars.h"), unit("globals", "vars0.cpp")]);
    sink.extend(&main, vec![unit("", "main.cpp")]);

    let commands = sink.commands_for(["globals/vars0.cpp", "globals/vars.h", "unknown.h", "main.cpp"]);
    let names: Vec<_> = commands.iter().map(|c| c.description()).collect();
    assert_eq!(names, vec!["vars", "main"]);
}

//! Rewriting realistic setup.py files

use pretty_assertions::assert_eq;
use pysync_descriptor::{
    ArgumentValue, DEPENDENCY_LINKS, Descriptor, EditKind, INSTALL_REQUIRES, ListEntry, extract,
    rewrite,
};

fn sync_list(source: &str, keyword: &str, entries: &[ListEntry]) -> String {
    let descriptor = Descriptor::parse(source).unwrap();
    let call = descriptor.setup_call().unwrap();
    let current = extract(&call, keyword).into_literal(keyword).unwrap();
    match rewrite(&call, keyword, current.as_ref(), entries) {
        Some(edit) => edit.apply(source),
        None => source.to_string(),
    }
}

const MULTILINE: &str = r#"#!/usr/bin/env python
"""Package metadata."""
import io

from setuptools import find_packages, setup

with io.open("README.md", encoding="utf-8") as f:
    long_description = f.read()

setup(
    name="demo",
    version="1.0.0",
    long_description=long_description,
    packages=find_packages(exclude=["tests"]),
    install_requires=[
        # HTTP
        "requests>=2.0",  # keep below 3
        "click==7.0",
        "six",
    ],
    entry_points={"console_scripts": ["demo=demo.cli:main"]},
)
"#;

#[test]
fn test_multiline_update_keeps_comments_and_layout() {
    let entries = [
        ListEntry::kept(0, "requests==2.31.0"),
        ListEntry::kept(1, "click==7.0"),
        ListEntry::added("attrs==23.1.0"),
    ];
    let updated = sync_list(MULTILINE, INSTALL_REQUIRES, &entries);

    insta::assert_snapshot!(updated, @r###"
    #!/usr/bin/env python
    """Package metadata."""
    import io

    from setuptools import find_packages, setup

    with io.open("README.md", encoding="utf-8") as f:
        long_description = f.read()

    setup(
        name="demo",
        version="1.0.0",
        long_description=long_description,
        packages=find_packages(exclude=["tests"]),
        install_requires=[
            # HTTP
            "requests==2.31.0",  # keep below 3
            "click==7.0",
            "attrs==23.1.0",
        ],
        entry_points={"console_scripts": ["demo=demo.cli:main"]},
    )
    "###);
}

#[test]
fn test_insert_after_trailing_comma() {
    let source = "from setuptools import setup\n\nsetup(\n    name=\"demo\",\n    version=\"1.0\",\n)\n";
    let updated = sync_list(source, INSTALL_REQUIRES, &[ListEntry::added("requests==2.31.0")]);
    assert_eq!(
        updated,
        "from setuptools import setup\n\nsetup(\n    name=\"demo\",\n    version=\"1.0\",\n    install_requires=[\n        \"requests==2.31.0\",\n    ],\n)\n"
    );
}

#[test]
fn test_insert_without_trailing_comma() {
    let source = "setup(\n    name=\"demo\",\n    version=\"1.0\"\n)\n";
    let updated = sync_list(source, INSTALL_REQUIRES, &[ListEntry::added("requests==2.31.0")]);
    assert_eq!(
        updated,
        "setup(\n    name=\"demo\",\n    version=\"1.0\",\n    install_requires=[\n        \"requests==2.31.0\",\n    ]\n)\n"
    );
}

#[test]
fn test_insert_after_same_line_comment() {
    let source = "setup(\n    name=\"demo\",  # the name\n)\n";
    let updated = sync_list(source, DEPENDENCY_LINKS, &[ListEntry::added("git+https://h/r.git@v1#egg=r")]);
    assert_eq!(
        updated,
        "setup(\n    name=\"demo\",  # the name\n    dependency_links=[\n        \"git+https://h/r.git@v1#egg=r\",\n    ],\n)\n"
    );
}

fn has_bare_lf(text: &str) -> bool {
    text.replace("\r\n", "").contains('\n')
}

#[test]
fn test_crlf_list_update_keeps_line_endings() {
    let source = "setup(\r\n    install_requires=[\r\n        \"a==1\",\r\n    ],\r\n)\r\n";
    let entries = [ListEntry::kept(0, "a==2"), ListEntry::added("b==1")];
    let updated = sync_list(source, INSTALL_REQUIRES, &entries);
    assert_eq!(
        updated,
        "setup(\r\n    install_requires=[\r\n        \"a==2\",\r\n        \"b==1\",\r\n    ],\r\n)\r\n"
    );
    assert!(!has_bare_lf(&updated));
}

#[test]
fn test_crlf_comments_keep_line_endings() {
    let source = "setup(\r\n    install_requires=[\r\n        # web\r\n        'a==1',  # pinned\r\n    ],\r\n)\r\n";
    let entries = [ListEntry::kept(0, "a==2"), ListEntry::added("b==1")];
    let updated = sync_list(source, INSTALL_REQUIRES, &entries);
    assert_eq!(
        updated,
        "setup(\r\n    install_requires=[\r\n        # web\r\n        'a==2',  # pinned\r\n        'b==1',\r\n    ],\r\n)\r\n"
    );
}

#[test]
fn test_crlf_insert_keeps_line_endings() {
    let source = "setup(\r\n    name=\"x\",  # the name\r\n)\r\n";
    let updated = sync_list(source, INSTALL_REQUIRES, &[ListEntry::added("b==1")]);
    assert_eq!(
        updated,
        "setup(\r\n    name=\"x\",  # the name\r\n    install_requires=[\r\n        \"b==1\",\r\n    ],\r\n)\r\n"
    );
    assert!(!has_bare_lf(&updated));

    let empty_call = sync_list("setup()\r\n", INSTALL_REQUIRES, &[ListEntry::added("b==1")]);
    assert_eq!(
        empty_call,
        "setup(\r\n    install_requires=[\r\n        \"b==1\",\r\n    ],\r\n)\r\n"
    );
}

#[test]
fn test_insert_reports_edit_kind() {
    let source = "setup(name='x')";
    let descriptor = Descriptor::parse(source).unwrap();
    let call = descriptor.setup_call().unwrap();
    let edit = rewrite(&call, INSTALL_REQUIRES, None, &[ListEntry::added("a")]).unwrap();
    assert_eq!(edit.kind, EditKind::Insert);
    assert_eq!(edit.span, 14..14);
}

#[test]
fn test_rewrite_is_stable() {
    let entries = [
        ListEntry::kept(0, "requests==2.31.0"),
        ListEntry::added("attrs==23.1.0"),
    ];
    let once = sync_list(MULTILINE, INSTALL_REQUIRES, &entries);

    let descriptor = Descriptor::parse(once.as_str()).unwrap();
    let call = descriptor.setup_call().unwrap();
    let list = match extract(&call, INSTALL_REQUIRES) {
        ArgumentValue::Literal(list) => list,
        other => panic!("unexpected {other:?}"),
    };
    assert_eq!(
        list.values().collect::<Vec<_>>(),
        vec!["requests==2.31.0", "attrs==23.1.0"]
    );

    let same: Vec<ListEntry> = list
        .values()
        .enumerate()
        .map(|(i, v)| ListEntry::kept(i, v))
        .collect();
    assert_eq!(sync_list(&once, INSTALL_REQUIRES, &same), once);
}

#[test]
fn test_other_keyword_untouched_when_both_exist() {
    let source = "setup(install_requires=['a'], dependency_links=['git+https://h/x.git#egg=x'])";
    let updated = sync_list(source, DEPENDENCY_LINKS, &[]);
    assert_eq!(updated, "setup(install_requires=['a'], dependency_links=[])");
}

mod non_interference {
    use super::*;
    use proptest::prelude::*;

    const PREFIX: &str = "from setuptools import setup\n\nsetup(\n    name=\"demo\",\n    install_requires=";
    const SUFFIX: &str = ",\n    zip_safe=False,\n)\n# end\n";

    proptest! {
        #[test]
        fn test_bytes_outside_list_are_preserved(
            current in prop::collection::vec("[a-z]{1,8}(==[0-9]\\.[0-9])?", 0..5),
            target in prop::collection::vec("[a-z]{1,8}(==[0-9]\\.[0-9])?", 0..5),
        ) {
            let literal: Vec<String> = current.iter().map(|r| format!("'{r}'")).collect();
            let source = format!("{PREFIX}[{}]{SUFFIX}", literal.join(", "));
            let entries: Vec<ListEntry> = target.iter().map(ListEntry::added).collect();

            let updated = sync_list(&source, INSTALL_REQUIRES, &entries);

            prop_assert!(updated.starts_with(PREFIX));
            prop_assert!(updated.ends_with(SUFFIX));

            let descriptor = Descriptor::parse(updated.as_str()).unwrap();
            let call = descriptor.setup_call().unwrap();
            let values: Vec<String> = match extract(&call, INSTALL_REQUIRES) {
                ArgumentValue::Literal(list) => list.values().map(str::to_string).collect(),
                other => panic!("unexpected {other:?}"),
            };
            prop_assert_eq!(values, target);
        }
    }
}

//! Skeleton `setup.py` for projects that do not have one yet.

use crate::extract::encode_string;

/// A minimal `setup.py` whose empty `install_requires` the rewriter fills.
pub fn new_descriptor(project_name: &str) -> String {
    format!(
        "from setuptools import find_packages, setup\n\
         \n\
         setup(\n    \
         name={},\n    \
         version=\"0.1.0\",\n    \
         packages=find_packages(),\n    \
         install_requires=[],\n\
         )\n",
        encode_string(project_name, '"')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{ArgumentValue, extract};
    use crate::locate::Descriptor;

    #[test]
    fn test_template_text() {
        insta::assert_snapshot!(new_descriptor("my-project"), @r###"
        from setuptools import find_packages, setup

        setup(
            name="my-project",
            version="0.1.0",
            packages=find_packages(),
            install_requires=[],
        )
        "###);
    }

    #[test]
    fn test_template_parses_with_empty_requirements() {
        let descriptor = Descriptor::parse(new_descriptor("odd \"name\"")).unwrap();
        let call = descriptor.setup_call().unwrap();
        match extract(&call, "install_requires") {
            ArgumentValue::Literal(list) => assert!(list.is_empty()),
            other => panic!("unexpected {other:?}"),
        }
    }
}

//! Publish script generation.

use crate::build_api::BuildDefinition;

/// Substitutes the build placeholders in a script template.
pub fn render_script(template: &str, build: &BuildDefinition) -> String {
    template
        .replace("$buildNumber$", &build.build_number.to_string())
        .replace("$fileName$", &build.file_name)
        .replace("$commitId$", &build.commit_id)
        .replace("$commitMessage$", &build.commit_message)
        .replace("$scmBranch$", &build.scm_branch)
}

/// File name of the script generated from `template_name` for a build.
///
/// `app_build_template.vdf` becomes `app_build_43.vdf`; a template name
/// without the word `template` gets the build number as a prefix.
pub fn script_name_for(template_name: &str, build_number: u64) -> String {
    if template_name.contains("template") {
        template_name.replace("template", &build_number.to_string())
    } else {
        format!("{}_{}", build_number, template_name)
    }
}

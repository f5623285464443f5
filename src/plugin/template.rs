//! Commented example snippets used when `edit` creates a new file

use super::descriptor::PluginKind;

/// Placeholder replaced by the snippet name
pub const ID_PLACEHOLDER: &str = "${id}";

const PROMOTER: &str = r#"[[promoter]]
id = "${id}"
[promoter.resources.${resname}]
start = ["${service.mount}", "${service.service}"]
# runner = "systemd"
## with runner "shell" and an empty 'stop', services from 'start' are stopped in reverse order
## with runner "systemd" stopping means stopping the generated drbd-services@.target
# stop = []
# on-drbd-demote-failure = "reboot"
# stop-services-on-exit = false
"#;

const PROMETHEUS: &str = r#"[[prometheus]]
id = "${id}"  # usually there is only one endpoint per node
enums = true
# address = "0.0.0.0:9942"
"#;

const UMH: &str = r#"[[umh]]
id = "${id}"
[[umh.resource]]
command = "slack.sh $DRBD_RES_NAME on $(uname -n) from $DRBD_OLD_ROLE to $DRBD_NEW_ROLE"
event-type = "Change"
old.role = { operator = "NotEquals", value = "Primary" }
new.role = "Primary"
# see drbd-reactor.umh(5) for more rule examples
"#;

const DEBUGGER: &str = r#"[[debugger]]
id = "${id}"  # usually there is only one debugger
# the [[log]] section of the main config needs at least level "debug"
"#;

/// Example document for `kind`, with `${id}` replaced by `id`
pub fn template(kind: PluginKind, id: &str) -> String {
    let raw = match kind {
        PluginKind::Promoter => PROMOTER,
        PluginKind::Prometheus => PROMETHEUS,
        PluginKind::Umh => UMH,
        PluginKind::Debugger => DEBUGGER,
    };
    raw.replace(ID_PLACEHOLDER, id)
}

use serde_json::Value;

/// Page rendering seam. Handlers hand over a view name plus a JSON payload;
/// the renderer owns all markup. Chart payloads are inlined into the page as
/// an `application/json` script island for the client-side chart code.
pub trait Renderer: Send + Sync {
    fn render(&self, view: &str, data: &Value) -> String;
}

pub struct HtmlRenderer;

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Serialize a JSON payload so it is safe inside a `<script>` element.
fn embed_json(value: &Value) -> String {
    value.to_string().replace("</", "<\\/")
}

fn str_field<'a>(data: &'a Value, key: &str) -> Option<&'a str> {
    data.get(key).and_then(Value::as_str)
}

fn form_markup(view: &str, data: &Value) -> String {
    match view {
        "register" => r#"<form method="post" action="/register">
  <label>Username <input name="username" required></label>
  <label>Email <input name="email" type="email" required></label>
  <label>Password <input name="password" type="password" required></label>
  <button type="submit">Sign up</button>
</form>"#
            .to_string(),
        "login" => r#"<form method="post" action="/login">
  <label>Email <input name="email" type="email" required></label>
  <label>Password <input name="password" type="password" required></label>
  <label><input name="remember" type="checkbox"> Remember me</label>
  <button type="submit">Log in</button>
</form>
<p><a href="/reset_password">Forgot password?</a></p>"#
            .to_string(),
        "reset_request" => r#"<form method="post" action="/reset_password">
  <label>Email <input name="email" type="email" required></label>
  <button type="submit">Request password reset</button>
</form>"#
            .to_string(),
        "reset_password" => {
            let action = str_field(data, "action").unwrap_or("/reset_password");
            format!(
                r#"<form method="post" action="{}">
  <label>New password <input name="password" type="password" required></label>
  <button type="submit">Reset password</button>
</form>"#,
                escape(action)
            )
        }
        "account" => {
            let username = data
                .pointer("/user/username")
                .and_then(Value::as_str)
                .unwrap_or_default();
            let email = data
                .pointer("/user/email")
                .and_then(Value::as_str)
                .unwrap_or_default();
            let avatar = str_field(data, "avatar_url").unwrap_or_default();
            format!(
                r#"<img class="avatar" src="{}" alt="avatar">
<form method="post" action="/account" enctype="multipart/form-data">
  <label>Username <input name="username" value="{}" required></label>
  <label>Email <input name="email" type="email" value="{}" required></label>
  <label>Picture <input name="picture" type="file" accept="image/*"></label>
  <button type="submit">Update</button>
</form>"#,
                escape(avatar),
                escape(username),
                escape(email)
            )
        }
        "home" => match str_field(data, "username") {
            Some(name) => format!(
                r#"<p>Signed in as {}.</p>
<p><a href="/activity">Activity</a> · <a href="/daychart">Day</a> · <a href="/weekchart">Week</a> · <a href="/monthchart">Month</a> · <a href="/yearchart">Year</a> · <a href="/account">Account</a> · <a href="/logout">Log out</a></p>"#,
                escape(name)
            ),
            None => r#"<p><a href="/login">Log in</a> or <a href="/register">sign up</a> to start tracking.</p>"#.to_string(),
        },
        "activity" => {
            let rows: String = data
                .get("activities")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .map(|a| {
                            format!(
                                "<tr><td>{}</td><td>{}</td></tr>\n",
                                escape(a.get("start_time").and_then(Value::as_str).unwrap_or("")),
                                escape(a.get("end_time").and_then(Value::as_str).unwrap_or(""))
                            )
                        })
                        .collect()
                })
                .unwrap_or_default();
            format!(
                "<table><thead><tr><th>Start</th><th>End</th></tr></thead><tbody>\n{rows}</tbody></table>"
            )
        }
        _ => String::new(),
    }
}

impl Renderer for HtmlRenderer {
    fn render(&self, view: &str, data: &Value) -> String {
        let title = str_field(data, "title").unwrap_or(view);
        let mut body = String::new();

        if let Some(flash) = str_field(data, "flash") {
            body.push_str(&format!("<p class=\"flash\">{}</p>\n", escape(flash)));
        }

        body.push_str(&form_markup(view, data));

        if let Some(chart) = data.get("chart") {
            body.push_str(&format!(
                "\n<p class=\"total\">Total: {}</p>\n<canvas id=\"chart\"></canvas>\n<script id=\"chart-data\" type=\"application/json\">{}</script>",
                escape(chart.get("total").and_then(Value::as_str).unwrap_or("")),
                embed_json(chart)
            ));
        }

        format!(
            "<!doctype html>\n<html><head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n<h1>{}</h1>\n{}\n</body></html>\n",
            escape(title),
            escape(title),
            body
        )
    }
}

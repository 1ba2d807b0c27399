//! Upload page - a single HTML form that posts a photo to `/upload` and
//! shows the returned mosaic.

/// Generate the upload page.
///
/// # Arguments
///
/// * `default_cell_size` - Pre-filled tile size
/// * `max_cell_size` - Upper bound for the tile size input
/// * `tile_count` - Number of tiles available, shown as a hint
pub fn render_index(default_cell_size: u32, max_cell_size: u32, tile_count: usize) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Photomosaic</title>
    <style>
        * {{
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }}
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: #1a1a1a;
            color: #e0e0e0;
            padding: 24px;
        }}
        h1 {{
            font-size: 20px;
            font-weight: 500;
            margin-bottom: 16px;
        }}
        form {{
            display: flex;
            flex-wrap: wrap;
            gap: 12px;
            align-items: center;
            margin-bottom: 16px;
        }}
        input[type=number] {{
            width: 80px;
        }}
        button {{
            padding: 6px 16px;
            background: #3a6ea5;
            color: #fff;
            border: none;
            border-radius: 4px;
            cursor: pointer;
        }}
        button:disabled {{
            background: #555;
            cursor: wait;
        }}
        #status {{
            font-size: 13px;
            color: #aaa;
            margin-bottom: 12px;
        }}
        #status.error {{
            color: #e57373;
        }}
        #result {{
            max-width: 100%;
        }}
    </style>
</head>
<body>
    <h1>Photomosaic</h1>
    <form id="upload" action="/upload" method="post" enctype="multipart/form-data">
        <input type="file" name="image" accept="image/jpeg,image/png" required>
        <label>Tile size
            <input type="number" name="tile_size" min="1" max="{max_cell_size}" value="{default_cell_size}">
        </label>
        <button type="submit">Generate</button>
    </form>
    <div id="status">{tile_count} tiles available</div>
    <img id="result" alt="">

    <script>
        const form = document.getElementById('upload');
        const status = document.getElementById('status');
        const result = document.getElementById('result');
        const button = form.querySelector('button');

        form.addEventListener('submit', async (event) => {{
            event.preventDefault();
            button.disabled = true;
            status.className = '';
            status.textContent = 'Generating...';

            try {{
                const response = await fetch('/upload', {{
                    method: 'POST',
                    body: new FormData(form),
                }});

                if (!response.ok) {{
                    const body = await response.json().catch(() => ({{}}));
                    throw new Error(body.message || response.statusText);
                }}

                const blob = await response.blob();
                if (result.src) {{
                    URL.revokeObjectURL(result.src);
                }}
                result.src = URL.createObjectURL(blob);

                const ms = response.headers.get('X-Mosaic-Duration-Ms');
                const used = response.headers.get('X-Mosaic-Tiles-Used');
                status.textContent = `Done in ${{ms}} ms using ${{used}} tiles`;
            }} catch (err) {{
                status.className = 'error';
                status.textContent = err.message;
            }} finally {{
                button.disabled = false;
            }}
        }});
    </script>
</body>
</html>
"##,
        default_cell_size = default_cell_size,
        max_cell_size = max_cell_size,
        tile_count = tile_count,
    )
}
